#![deny(unsafe_code)]

pub mod attachment;
pub mod config;
pub mod error;
pub mod history;
pub mod ids;
pub mod message;
pub mod reply;
pub mod reveal;
/// Conversation search over message display text.
pub mod search;
/// Single reducer that owns every piece of chat state.
pub mod state;

pub use attachment::{
    AttachmentLoadHandle, AttachmentStream, DataUrl, MAX_PENDING_ATTACHMENTS, PendingAttachment,
    attachment_label, load_attachments,
};
pub use config::{ChatConfig, ThemeChoice};
pub use error::{AttachmentError, AttachmentResult, ConfigError, ConfigResult};
pub use history::{HISTORY_LIMIT, History, HistoryEntry};
pub use ids::{AttachmentId, HighlightToken, MessageId, StreamSessionId};
pub use message::{Attachment, Message, MessageStatus, Role, StreamState};
pub use reply::{ReplyRule, ReplyTable};
pub use reveal::Reveal;
pub use search::{MatchSpans, SearchResult};
pub use state::{Action, ChatState, Effect};
