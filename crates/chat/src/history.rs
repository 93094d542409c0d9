use std::collections::HashSet;

use crate::ids::MessageId;

/// Most entries kept in the recent-question list.
pub const HISTORY_LIMIT: usize = 10;

/// One sent question as shown in the history panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Id of the user message this entry was recorded from.
    pub id: MessageId,
    pub text: String,
}

/// Bounded most-recent-first list of sent labels with an edit mode.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    limit: usize,
    editing: bool,
    selected: HashSet<MessageId>,
}

impl History {
    /// Creates an empty history keeping at most `limit` entries (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
            editing: false,
            selected: HashSet::new(),
        }
    }

    /// Entries newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Whether the entry is part of the edit-mode selection.
    pub fn is_selected(&self, id: MessageId) -> bool {
        self.selected.contains(&id)
    }

    /// Size of the edit-mode selection.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Prepends an entry and drops the oldest ones past the limit.
    pub fn record(&mut self, id: MessageId, text: impl Into<String>) {
        self.entries.insert(
            0,
            HistoryEntry {
                id,
                text: text.into(),
            },
        );
        self.entries.truncate(self.limit);
        // Entries pushed out by truncation cannot stay selected.
        let live = self.entries.iter().map(|entry| entry.id).collect::<HashSet<_>>();
        self.selected.retain(|id| live.contains(id));
    }

    /// Flips edit mode; the selection always starts empty.
    pub fn toggle_edit(&mut self) {
        self.editing = !self.editing;
        self.selected.clear();
    }

    /// Returns whether the entry is selected afterwards.
    pub fn toggle_selected(&mut self, id: MessageId) -> bool {
        if !self.entries.iter().any(|entry| entry.id == id) {
            return false;
        }

        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Deletes the selected entries and leaves edit mode.
    ///
    /// Does nothing when the selection is empty.
    pub fn delete_selected(&mut self) -> usize {
        if self.selected.is_empty() {
            return 0;
        }

        let before = self.entries.len();
        let selected = std::mem::take(&mut self.selected);
        self.entries.retain(|entry| !selected.contains(&entry.id));
        self.editing = false;
        before - self.entries.len()
    }

    /// Removes every entry and leaves edit mode.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected.clear();
        self.editing = false;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: usize) -> Vec<MessageId> {
        (0..count).map(|_| MessageId::new_v7()).collect()
    }

    #[test]
    fn keeps_ten_newest_entries_first() {
        let mut history = History::default();
        let ids = ids(12);
        for (index, id) in ids.iter().enumerate() {
            history.record(*id, format!("question {index}"));
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0].text, "question 11");
        assert_eq!(history.entries()[9].text, "question 2");
        assert!(history.entries().iter().all(|entry| entry.id != ids[0]));
    }

    #[test]
    fn delete_selected_removes_only_selection_and_exits_edit() {
        let mut history = History::default();
        let ids = ids(3);
        for id in &ids {
            history.record(*id, "q");
        }

        history.toggle_edit();
        assert!(history.toggle_selected(ids[0]));
        assert!(history.toggle_selected(ids[2]));
        assert!(!history.toggle_selected(ids[2]));
        assert_eq!(history.selected_count(), 1);

        assert_eq!(history.delete_selected(), 1);
        assert!(!history.is_editing());
        assert_eq!(history.selected_count(), 0);
        assert_eq!(
            history.entries().iter().map(|entry| entry.id).collect::<Vec<_>>(),
            vec![ids[2], ids[1]]
        );
    }

    #[test]
    fn delete_selected_with_empty_selection_stays_in_edit() {
        let mut history = History::default();
        history.record(MessageId::new_v7(), "q");
        history.toggle_edit();
        assert_eq!(history.delete_selected(), 0);
        assert!(history.is_editing());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn clear_empties_list_and_exits_edit() {
        let mut history = History::default();
        let id = MessageId::new_v7();
        history.record(id, "q");
        history.toggle_edit();
        history.toggle_selected(id);

        history.clear();
        assert!(history.is_empty());
        assert!(!history.is_editing());
        assert_eq!(history.selected_count(), 0);
    }

    #[test]
    fn toggling_edit_resets_selection() {
        let mut history = History::default();
        let id = MessageId::new_v7();
        history.record(id, "q");
        history.toggle_edit();
        history.toggle_selected(id);
        history.toggle_edit();
        assert!(!history.is_editing());
        assert!(!history.is_selected(id));
    }

    #[test]
    fn unknown_ids_cannot_be_selected() {
        let mut history = History::default();
        history.toggle_edit();
        assert!(!history.toggle_selected(MessageId::new_v7()));
        assert_eq!(history.selected_count(), 0);
    }
}
