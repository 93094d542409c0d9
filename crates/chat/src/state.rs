use std::path::PathBuf;
use std::time::Duration;

use crate::attachment::{PendingAttachment, accept_batch, attachment_label};
use crate::config::{ChatConfig, ThemeChoice};
use crate::history::History;
use crate::ids::{AttachmentId, HighlightToken, MessageId, StreamSessionId};
use crate::message::{Message, MessageStatus, StreamState, StreamTransition};
use crate::reply::ReplyTable;
use crate::reveal::Reveal;
use crate::search::{self, SearchResult};

/// Everything the user or a timer can do to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    InputChanged(String),
    Submit,
    /// Cancels the reply in flight, if any.
    Stop,
    /// The artificial delay for a scheduled reply has elapsed.
    ReplyDue(StreamSessionId),
    /// One scheduler step for every active reveal.
    RevealTick,
    FilesPicked(Vec<PathBuf>),
    AttachmentLoaded(PendingAttachment),
    RemoveAttachment(AttachmentId),
    QueryChanged(String),
    ClearQuery,
    ToggleSearch,
    SelectSearchResult(MessageId),
    SelectHistoryEntry(MessageId),
    ToggleHistoryEdit,
    DeleteSelectedHistory,
    ClearHistory,
    HighlightExpired(HighlightToken),
    ToggleTheme,
}

/// Work the front-end must perform after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Dispatch `Action::ReplyDue(session)` after `delay`.
    ScheduleReply {
        session: StreamSessionId,
        delay: Duration,
    },
    /// Dispatch `Action::RevealTick` every `interval` while `ChatState::is_revealing` holds.
    StartRevealTicker { interval: Duration },
    /// Convert these files and dispatch `Action::AttachmentLoaded` for each one.
    LoadAttachments(Vec<PathBuf>),
    ClearInput,
    ScrollToBottom,
    /// Scroll the message into view; it is highlighted until the matching expiry.
    JumpTo(MessageId),
    /// Dispatch `Action::HighlightExpired(token)` after `after`.
    ExpireHighlight {
        token: HighlightToken,
        after: Duration,
    },
    ApplyTheme(ThemeChoice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingReply {
    session: StreamSessionId,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Highlight {
    message_id: MessageId,
    token: HighlightToken,
}

/// In-memory state of one chat session, updated only through [`ChatState::apply`].
#[derive(Debug, Clone)]
pub struct ChatState {
    config: ChatConfig,
    replies: ReplyTable,
    messages: Vec<Message>,
    input: String,
    pending_attachments: Vec<PendingAttachment>,
    history: History,
    query: String,
    search_open: bool,
    results: Vec<SearchResult>,
    stream_state: StreamState,
    pending_reply: Option<PendingReply>,
    reveals: Vec<Reveal>,
    next_session_id: u64,
    highlight: Option<Highlight>,
    next_highlight_token: u64,
    theme: ThemeChoice,
}

impl ChatState {
    /// Seeds the conversation with the configured greeting.
    ///
    /// The config is normalized first, so limits and speeds hold even for values built in code.
    pub fn new(config: ChatConfig, replies: ReplyTable) -> Self {
        let config = config.normalized();
        let greeting = Message::assistant(config.greeting.clone());
        Self {
            history: History::new(config.history_limit),
            theme: config.theme,
            config,
            replies,
            messages: vec![greeting],
            input: String::new(),
            pending_attachments: Vec::new(),
            query: String::new(),
            search_open: false,
            results: Vec::new(),
            stream_state: StreamState::Idle,
            pending_reply: None,
            reveals: Vec::new(),
            next_session_id: 1,
            highlight: None,
            next_highlight_token: 1,
        }
    }

    /// Builds state from config, using the built-in reply table if the configured one is invalid.
    pub fn from_config(config: ChatConfig) -> Self {
        let replies = config.reply_table().unwrap_or_else(|error| {
            tracing::warn!("{}. using built-in reply table", error);
            ReplyTable::default()
        });
        Self::new(config, replies)
    }

    /// Normalized configuration this session runs with.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// All messages in display order, greeting first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up a message by id.
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    /// Row index of a message in the list, used to scroll it into view.
    pub fn message_index(&self, id: MessageId) -> Option<usize> {
        self.messages.iter().position(|message| message.id == id)
    }

    /// Current composer text, untrimmed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Converted files waiting for the next send, in arrival order.
    pub fn pending_attachments(&self) -> &[PendingAttachment] {
        &self.pending_attachments
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Search query as typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_search_open(&self) -> bool {
        self.search_open
    }

    /// Matches for the current query in message order.
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn stream_state(&self) -> &StreamState {
        &self.stream_state
    }

    pub fn theme(&self) -> ThemeChoice {
        self.theme
    }

    /// Message currently carrying the jump highlight.
    pub fn highlighted(&self) -> Option<MessageId> {
        self.highlight.map(|highlight| highlight.message_id)
    }

    /// True from send until the reply is fully revealed or stopped.
    pub fn is_loading(&self) -> bool {
        self.stream_state.is_active()
    }

    /// True while at least one reply is still being typed out.
    pub fn is_revealing(&self) -> bool {
        !self.reveals.is_empty()
    }

    /// Whether a send would do anything: idle, with text or attachments.
    pub fn can_send(&self) -> bool {
        !self.is_loading()
            && (!self.input.trim().is_empty() || !self.pending_attachments.is_empty())
    }

    /// How many more files can be attached before the limit.
    pub fn attachment_capacity(&self) -> usize {
        self.config
            .max_attachments
            .saturating_sub(self.pending_attachments.len())
    }

    /// Composer placeholder for the current loading state.
    pub fn placeholder(&self) -> &'static str {
        if self.is_loading() {
            "Generating a reply…"
        } else {
            "Type a message (Enter to send, Shift+Enter for a new line)"
        }
    }

    /// Applies one action and returns the side effects the front-end must run.
    ///
    /// Actions that do not apply in the current state are ignored and logged at debug level.
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::InputChanged(input) => {
                self.input = input;
                Vec::new()
            }
            Action::Submit => self.submit(),
            Action::Stop => self.stop(),
            Action::ReplyDue(session) => self.begin_reply(session),
            Action::RevealTick => self.reveal_tick(),
            Action::FilesPicked(paths) => self.files_picked(paths),
            Action::AttachmentLoaded(attachment) => {
                self.attachment_loaded(attachment);
                Vec::new()
            }
            Action::RemoveAttachment(id) => {
                self.pending_attachments
                    .retain(|attachment| attachment.id != id);
                Vec::new()
            }
            Action::QueryChanged(query) => {
                self.query = query;
                self.refresh_results();
                Vec::new()
            }
            Action::ClearQuery => {
                self.query.clear();
                self.refresh_results();
                Vec::new()
            }
            Action::ToggleSearch => {
                self.search_open = !self.search_open;
                Vec::new()
            }
            Action::SelectSearchResult(id) => self.jump_to(id),
            Action::SelectHistoryEntry(id) => {
                if self.history.is_editing() {
                    self.history.toggle_selected(id);
                    Vec::new()
                } else {
                    self.jump_to(id)
                }
            }
            Action::ToggleHistoryEdit => {
                self.history.toggle_edit();
                Vec::new()
            }
            Action::DeleteSelectedHistory => {
                let removed = self.history.delete_selected();
                tracing::debug!(removed, "deleted selected history entries");
                Vec::new()
            }
            Action::ClearHistory => {
                self.history.clear();
                Vec::new()
            }
            Action::HighlightExpired(token) => {
                if self.highlight.is_some_and(|highlight| highlight.token == token) {
                    self.highlight = None;
                }
                Vec::new()
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
                vec![Effect::ApplyTheme(self.theme)]
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if !self.can_send() {
            tracing::debug!(
                loading = self.is_loading(),
                pending_attachments = self.pending_attachments.len(),
                "ignoring submit with nothing to send"
            );
            return Vec::new();
        }

        let trimmed = self.input.trim().to_string();
        let attachments = std::mem::take(&mut self.pending_attachments);
        let label = if trimmed.is_empty() {
            let names = attachments
                .iter()
                .map(|attachment| attachment.name.as_str())
                .collect::<Vec<_>>();
            attachment_label(&names)
        } else {
            trimmed.clone()
        };

        let message = Message::user(
            trimmed.clone(),
            label.clone(),
            attachments
                .into_iter()
                .map(PendingAttachment::into_attachment)
                .collect(),
        );
        let message_id = message.id;
        self.messages.push(message);
        self.history.record(message_id, label);
        self.input.clear();

        let session = self.alloc_session_id();
        if let Err(rejection) = self.transition(StreamTransition::Schedule(session)) {
            // can_send() already excluded an active reply.
            tracing::error!(?rejection, "reply could not be scheduled");
            return vec![Effect::ClearInput, Effect::ScrollToBottom];
        }
        self.pending_reply = Some(PendingReply {
            session,
            text: self.replies.select(&trimmed).to_string(),
        });
        self.refresh_results();

        tracing::debug!(%message_id, session = session.0, "user message sent");
        vec![
            Effect::ClearInput,
            Effect::ScrollToBottom,
            Effect::ScheduleReply {
                session,
                delay: self.config.reply_delay(),
            },
        ]
    }

    fn begin_reply(&mut self, session: StreamSessionId) -> Vec<Effect> {
        let Some(pending) = self
            .pending_reply
            .take_if(|pending| pending.session == session)
        else {
            tracing::debug!(session = session.0, "ignoring stale reply timer");
            return Vec::new();
        };

        if let Err(rejection) = self.transition(StreamTransition::Begin(session)) {
            tracing::debug!(?rejection, "reply could not begin");
            return Vec::new();
        }

        let message = Message::assistant_streaming(session);
        let reveal = Reveal::new(message.id, session, pending.text);
        self.messages.push(message);

        if reveal.is_complete() {
            self.finish_reveal(&reveal);
            self.refresh_results();
            return vec![Effect::ScrollToBottom];
        }

        self.reveals.push(reveal);
        self.refresh_results();
        vec![
            Effect::ScrollToBottom,
            Effect::StartRevealTicker {
                interval: self.config.reveal_interval(),
            },
        ]
    }

    fn reveal_tick(&mut self) -> Vec<Effect> {
        if self.reveals.is_empty() {
            return Vec::new();
        }

        let chars_per_tick = self.config.chars_per_tick;
        let mut reveals = std::mem::take(&mut self.reveals);
        for reveal in &mut reveals {
            let visible = reveal.advance(chars_per_tick).to_string();
            if let Some(message) = self.message_mut(reveal.message_id()) {
                message.text = visible;
            }
        }

        let (finished, active): (Vec<_>, Vec<_>) =
            reveals.into_iter().partition(Reveal::is_complete);
        self.reveals = active;
        for reveal in &finished {
            self.finish_reveal(reveal);
        }

        self.refresh_results();
        vec![Effect::ScrollToBottom]
    }

    fn finish_reveal(&mut self, reveal: &Reveal) {
        if let Some(message) = self.message_mut(reveal.message_id()) {
            message.text = reveal.full_text().to_string();
            message.status = MessageStatus::Done;
        }
        if let Err(rejection) = self.transition(StreamTransition::Complete(reveal.session_id())) {
            tracing::debug!(?rejection, "reveal finished outside its session");
        }
    }

    fn stop(&mut self) -> Vec<Effect> {
        let Some(session) = self.stream_state.active_session() else {
            return Vec::new();
        };

        if let Err(rejection) = self.transition(StreamTransition::Cancel(session)) {
            tracing::debug!(?rejection, "stop ignored");
            return Vec::new();
        }

        self.pending_reply = None;
        let cancelled = std::mem::take(&mut self.reveals);
        for reveal in &cancelled {
            if let Some(message) = self.message_mut(reveal.message_id()) {
                message.status = MessageStatus::Cancelled;
            }
        }

        tracing::debug!(session = session.0, "reply stopped");
        Vec::new()
    }

    fn files_picked(&mut self, paths: Vec<PathBuf>) -> Vec<Effect> {
        let picked = paths.len();
        let accepted = accept_batch(
            paths,
            self.pending_attachments.len(),
            self.config.max_attachments,
        );
        if accepted.len() < picked {
            tracing::debug!(
                picked,
                accepted = accepted.len(),
                "attachment batch truncated to capacity"
            );
        }

        if accepted.is_empty() {
            Vec::new()
        } else {
            vec![Effect::LoadAttachments(accepted)]
        }
    }

    fn attachment_loaded(&mut self, attachment: PendingAttachment) {
        // Overlapping batches are sized against the count at pick time, so re-check here.
        if self.attachment_capacity() == 0 {
            tracing::debug!(name = %attachment.name, "dropping attachment beyond capacity");
            return;
        }
        self.pending_attachments.push(attachment);
    }

    fn jump_to(&mut self, message_id: MessageId) -> Vec<Effect> {
        if self.message(message_id).is_none() {
            tracing::debug!(%message_id, "jump target no longer exists");
            return Vec::new();
        }

        let token = HighlightToken(self.next_highlight_token);
        self.next_highlight_token = self.next_highlight_token.saturating_add(1);
        self.highlight = Some(Highlight { message_id, token });

        vec![
            Effect::JumpTo(message_id),
            Effect::ExpireHighlight {
                token,
                after: self.config.highlight_duration(),
            },
        ]
    }

    fn refresh_results(&mut self) {
        self.results = search::search(&self.messages, &self.query);
    }

    fn transition(
        &mut self,
        transition: StreamTransition,
    ) -> Result<(), crate::message::StreamTransitionRejection> {
        self.stream_state = self.stream_state.apply(transition)?;
        Ok(())
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|message| message.id == id)
    }

    fn alloc_session_id(&mut self) -> StreamSessionId {
        let id = StreamSessionId::new(self.next_session_id);
        self.next_session_id = self.next_session_id.saturating_add(1);
        id
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new(ChatConfig::default(), ReplyTable::default())
    }
}
