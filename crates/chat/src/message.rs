use crate::ids::{MessageId, StreamSessionId};

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

/// Image carried by a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    /// Embedded `data:` URL usable directly as an image source.
    pub url: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Lifecycle status for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStatus {
    Done,
    Streaming(StreamSessionId),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub attachments: Vec<Attachment>,
    /// Display string used by history and as search fallback when `text` is blank.
    pub label: String,
    pub status: MessageStatus,
}

impl Message {
    pub fn user(
        text: impl Into<String>,
        label: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id: MessageId::new_v7(),
            role: Role::User,
            text: text.into(),
            attachments,
            label: label.into(),
            status: MessageStatus::Done,
        }
    }

    /// Creates a finished assistant message, used for the opening greeting.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new_v7(),
            role: Role::Assistant,
            text: text.into(),
            attachments: Vec::new(),
            label: String::new(),
            status: MessageStatus::Done,
        }
    }

    /// Creates an empty assistant placeholder that a reveal will fill in.
    pub fn assistant_streaming(session_id: StreamSessionId) -> Self {
        Self {
            status: MessageStatus::Streaming(session_id),
            ..Self::assistant(String::new())
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Reply lifecycle for the single conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    /// Reply chosen, artificial delay still running.
    Waiting(StreamSessionId),
    Streaming(StreamSessionId),
    Done(StreamSessionId),
    Cancelled(StreamSessionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTransition {
    Schedule(StreamSessionId),
    Begin(StreamSessionId),
    Complete(StreamSessionId),
    Cancel(StreamSessionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTransitionRejection {
    AlreadyActive {
        active: StreamSessionId,
        attempted: StreamSessionId,
    },
    NotWaiting,
    NoActiveStream,
    SessionMismatch {
        active: StreamSessionId,
        attempted: StreamSessionId,
    },
}

pub type StreamTransitionResult = Result<StreamState, StreamTransitionRejection>;

impl StreamState {
    /// Returns the session that currently blocks new sends, if any.
    pub fn active_session(&self) -> Option<StreamSessionId> {
        match self {
            Self::Waiting(session) | Self::Streaming(session) => Some(*session),
            Self::Idle | Self::Done(_) | Self::Cancelled(_) => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_session().is_some()
    }

    /// Applies one transition deterministically.
    ///
    /// A new reply may only be scheduled while nothing is active. `Begin` must follow
    /// `Schedule` for the same session, and terminal transitions must name the active one.
    pub fn apply(&self, transition: StreamTransition) -> StreamTransitionResult {
        match transition {
            StreamTransition::Schedule(session) => self.apply_schedule(session),
            StreamTransition::Begin(session) => self.apply_begin(session),
            StreamTransition::Complete(session) => self.apply_complete(session),
            StreamTransition::Cancel(session) => self.apply_cancel(session),
        }
    }

    fn apply_schedule(&self, session: StreamSessionId) -> StreamTransitionResult {
        match self.active_session() {
            Some(active) => Err(StreamTransitionRejection::AlreadyActive {
                active,
                attempted: session,
            }),
            None => Ok(Self::Waiting(session)),
        }
    }

    fn apply_begin(&self, session: StreamSessionId) -> StreamTransitionResult {
        match self {
            Self::Waiting(active) if *active == session => Ok(Self::Streaming(session)),
            Self::Waiting(active) | Self::Streaming(active) => {
                Err(StreamTransitionRejection::SessionMismatch {
                    active: *active,
                    attempted: session,
                })
            }
            Self::Idle | Self::Done(_) | Self::Cancelled(_) => {
                Err(StreamTransitionRejection::NotWaiting)
            }
        }
    }

    fn apply_complete(&self, session: StreamSessionId) -> StreamTransitionResult {
        match self {
            Self::Streaming(active) if *active == session => Ok(Self::Done(session)),
            Self::Waiting(active) | Self::Streaming(active) => {
                Err(StreamTransitionRejection::SessionMismatch {
                    active: *active,
                    attempted: session,
                })
            }
            Self::Idle | Self::Done(_) | Self::Cancelled(_) => {
                Err(StreamTransitionRejection::NoActiveStream)
            }
        }
    }

    fn apply_cancel(&self, session: StreamSessionId) -> StreamTransitionResult {
        match self {
            Self::Waiting(active) | Self::Streaming(active) if *active == session => {
                Ok(Self::Cancelled(session))
            }
            Self::Waiting(active) | Self::Streaming(active) => {
                Err(StreamTransitionRejection::SessionMismatch {
                    active: *active,
                    attempted: session,
                })
            }
            Self::Idle | Self::Done(_) | Self::Cancelled(_) => {
                Err(StreamTransitionRejection::NoActiveStream)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: StreamSessionId = StreamSessionId::new(1);
    const SECOND: StreamSessionId = StreamSessionId::new(2);

    #[test]
    fn reply_lifecycle_walks_schedule_begin_complete() {
        let state = StreamState::Idle;
        let state = state.apply(StreamTransition::Schedule(FIRST)).unwrap();
        assert_eq!(state, StreamState::Waiting(FIRST));
        let state = state.apply(StreamTransition::Begin(FIRST)).unwrap();
        assert_eq!(state, StreamState::Streaming(FIRST));
        let state = state.apply(StreamTransition::Complete(FIRST)).unwrap();
        assert_eq!(state, StreamState::Done(FIRST));
        assert!(!state.is_active());
    }

    #[test]
    fn second_schedule_is_rejected_while_active() {
        let waiting = StreamState::Waiting(FIRST);
        assert_eq!(
            waiting.apply(StreamTransition::Schedule(SECOND)),
            Err(StreamTransitionRejection::AlreadyActive {
                active: FIRST,
                attempted: SECOND,
            })
        );

        let done = StreamState::Done(FIRST);
        assert_eq!(
            done.apply(StreamTransition::Schedule(SECOND)),
            Ok(StreamState::Waiting(SECOND))
        );
    }

    #[test]
    fn stale_begin_after_cancel_is_rejected() {
        let cancelled = StreamState::Waiting(FIRST)
            .apply(StreamTransition::Cancel(FIRST))
            .unwrap();
        assert_eq!(cancelled, StreamState::Cancelled(FIRST));
        assert_eq!(
            cancelled.apply(StreamTransition::Begin(FIRST)),
            Err(StreamTransitionRejection::NotWaiting)
        );
    }

    #[test]
    fn terminal_transitions_require_matching_session() {
        let streaming = StreamState::Streaming(FIRST);
        assert_eq!(
            streaming.apply(StreamTransition::Complete(SECOND)),
            Err(StreamTransitionRejection::SessionMismatch {
                active: FIRST,
                attempted: SECOND,
            })
        );
        assert_eq!(
            StreamState::Idle.apply(StreamTransition::Cancel(FIRST)),
            Err(StreamTransitionRejection::NoActiveStream)
        );
    }
}
