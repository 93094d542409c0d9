/// Event contracts between the chat components and their coordinator.
pub mod events;
pub mod history_panel;
pub mod message_input;
pub mod message_list;
pub mod scroll_manager;
pub mod search_panel;
pub mod thumbnail;
pub mod view;

pub use events::{
    AttachRequested, AttachmentRemoved, HistoryCommand, HistoryEntrySelected, InputEdited,
    QueryCleared, QueryEdited, SearchResultSelected, Stop, Submit,
};
pub use history_panel::HistoryPanel;
pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use search_panel::SearchPanel;
pub use view::ChatView;
