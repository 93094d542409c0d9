use mimic_chat::{Action, AttachmentId, MessageId};

/// Emitted when the user presses Enter or clicks send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

/// Emitted when the user asks to cancel the reply in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stop;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEdited {
    pub content: String,
}

/// Emitted when the attach button is clicked; the coordinator owns the file picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachRequested;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentRemoved {
    pub attachment_id: AttachmentId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEdited {
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryCleared;

/// Emitted when a search result is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResultSelected {
    pub message_id: MessageId,
}

/// Emitted when a history row is clicked, in either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryEntrySelected {
    pub message_id: MessageId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryCommand {
    ToggleEdit,
    DeleteSelected,
    Clear,
}

impl Stop {
    pub fn into_action(self) -> Action {
        Action::Stop
    }
}

impl InputEdited {
    pub fn into_action(self) -> Action {
        Action::InputChanged(self.content)
    }
}

impl AttachmentRemoved {
    pub fn into_action(self) -> Action {
        Action::RemoveAttachment(self.attachment_id)
    }
}

impl QueryEdited {
    pub fn into_action(self) -> Action {
        Action::QueryChanged(self.query)
    }
}

impl QueryCleared {
    pub fn into_action(self) -> Action {
        Action::ClearQuery
    }
}

impl SearchResultSelected {
    pub fn into_action(self) -> Action {
        Action::SelectSearchResult(self.message_id)
    }
}

impl HistoryEntrySelected {
    /// The reducer decides between jumping and toggling selection based on edit mode.
    pub fn into_action(self) -> Action {
        Action::SelectHistoryEntry(self.message_id)
    }
}

impl HistoryCommand {
    pub fn into_action(self) -> Action {
        match self {
            Self::ToggleEdit => Action::ToggleHistoryEdit,
            Self::DeleteSelected => Action::DeleteSelectedHistory,
            Self::Clear => Action::ClearHistory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_commands_map_to_reducer_actions() {
        assert_eq!(
            HistoryCommand::ToggleEdit.into_action(),
            Action::ToggleHistoryEdit
        );
        assert_eq!(
            HistoryCommand::DeleteSelected.into_action(),
            Action::DeleteSelectedHistory
        );
        assert_eq!(HistoryCommand::Clear.into_action(), Action::ClearHistory);
    }

    #[test]
    fn edited_text_is_carried_verbatim() {
        let event = InputEdited {
            content: "  draft\n".to_string(),
        };
        assert_eq!(
            event.into_action(),
            Action::InputChanged("  draft\n".to_string())
        );
    }
}
