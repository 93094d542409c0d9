use std::ops::Range;

use crate::ids::MessageId;
use crate::message::{Message, Role};

pub const SNIPPET_CHARS_BEFORE: usize = 12;
pub const SNIPPET_CHARS_AFTER: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: MessageId,
    pub role: Role,
    /// Display string the match was found in.
    pub text: String,
    /// Byte offsets of the match within `text`, always on char boundaries.
    pub start: usize,
    pub end: usize,
}

/// Text split around one highlighted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpans<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

impl SearchResult {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Short context around the match for the results list.
    pub fn snippet(&self) -> MatchSpans<'_> {
        MatchSpans {
            before: tail_chars(&self.text[..self.start], SNIPPET_CHARS_BEFORE),
            matched: &self.text[self.start..self.end],
            after: head_chars(&self.text[self.end..], SNIPPET_CHARS_AFTER),
        }
    }
}

/// Picks the searchable string for a message.
///
/// Priority: text when it has non-whitespace content, then label, then the
/// space-joined attachment file names.
pub fn display_text(message: &Message) -> Option<String> {
    if !message.text.trim().is_empty() {
        return Some(message.text.clone());
    }
    if !message.label.is_empty() {
        return Some(message.label.clone());
    }

    let file_names = message
        .attachments
        .iter()
        .map(|attachment| attachment.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if file_names.trim().is_empty() {
        None
    } else {
        Some(file_names)
    }
}

/// Returns true when the query should produce results at all.
pub fn is_active_query(query: &str) -> bool {
    !query.trim().is_empty()
}

/// Recomputes the full result set for a query.
pub fn search(messages: &[Message], query: &str) -> Vec<SearchResult> {
    if !is_active_query(query) {
        return Vec::new();
    }

    messages
        .iter()
        .filter_map(|message| {
            let text = display_text(message)?;
            let found = find_case_insensitive(&text, query)?;
            Some(SearchResult {
                id: message.id,
                role: message.role,
                text,
                start: found.start,
                end: found.end,
            })
        })
        .collect()
}

/// Splits bubble text around the first match of the query, if any.
pub fn highlight<'a>(text: &'a str, query: &str) -> Option<MatchSpans<'a>> {
    if text.is_empty() || !is_active_query(query) {
        return None;
    }

    let found = find_case_insensitive(text, query)?;
    Some(MatchSpans {
        before: &text[..found.start],
        matched: &text[found.clone()],
        after: &text[found.end..],
    })
}

/// First case-insensitive occurrence of `needle` in `haystack`, as a byte range of `haystack`.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<Range<usize>> {
    let needle = needle.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    if needle.is_empty() {
        return None;
    }

    haystack.char_indices().find_map(|(start, _)| {
        match_len_at(&haystack[start..], &needle).map(|len| start..start + len)
    })
}

// Lowercasing may expand one char into several, so compare folded sequences and
// only accept a match that ends on a haystack char boundary.
fn match_len_at(rest: &str, needle: &[char]) -> Option<usize> {
    let mut expected = needle.iter().peekable();

    for (offset, ch) in rest.char_indices() {
        for lower in ch.to_lowercase() {
            match expected.next() {
                Some(&want) if want == lower => {}
                _ => return None,
            }
        }
        if expected.peek().is_none() {
            return Some(offset + ch.len_utf8());
        }
    }

    None
}

/// Human-readable result count line for the search panel.
pub fn summary(query: &str, result_count: usize) -> String {
    if query.is_empty() {
        "Type a keyword to search the conversation.".to_string()
    } else if result_count == 1 {
        "1 result".to_string()
    } else {
        format!("{result_count} results")
    }
}

fn tail_chars(text: &str, count: usize) -> &str {
    text.char_indices()
        .rev()
        .take(count)
        .last()
        .map(|(offset, _)| &text[offset..])
        .unwrap_or("")
}

fn head_chars(text: &str, count: usize) -> &str {
    text.char_indices()
        .nth(count)
        .map(|(offset, _)| &text[..offset])
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Attachment;

    fn image(name: &str) -> Attachment {
        Attachment::new(name, "data:image/png;base64,AA==")
    }

    #[test]
    fn display_text_follows_text_label_filename_priority() {
        let with_text = Message::user("  hello  ", "hello", Vec::new());
        assert_eq!(display_text(&with_text).as_deref(), Some("  hello  "));

        let label_only = Message::user("", "images ×1 (cat.png)", vec![image("cat.png")]);
        assert_eq!(
            display_text(&label_only).as_deref(),
            Some("images ×1 (cat.png)")
        );

        let names_only = Message::user("   ", "", vec![image("a.png"), image("b.png")]);
        assert_eq!(display_text(&names_only).as_deref(), Some("a.png b.png"));

        let nothing = Message::user("", "", Vec::new());
        assert_eq!(display_text(&nothing), None);
    }

    #[test]
    fn search_matches_case_insensitively_and_keeps_offsets() {
        let messages = vec![
            Message::assistant("Welcome aboard"),
            Message::user("Tell me about Rust", "Tell me about Rust", Vec::new()),
            Message::user("nothing here", "nothing here", Vec::new()),
        ];

        let results = search(&messages, "RUST");
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.id, messages[1].id);
        assert_eq!(result.role, Role::User);
        assert_eq!(&result.text[result.range()], "Rust");
    }

    #[test]
    fn blank_query_yields_no_results() {
        let messages = vec![Message::assistant("anything")];
        assert!(search(&messages, "").is_empty());
        assert!(search(&messages, "   ").is_empty());
    }

    #[test]
    fn only_first_occurrence_is_reported() {
        let messages = vec![Message::assistant("abc abc")];
        let results = search(&messages, "abc");
        assert_eq!((results[0].start, results[0].end), (0, 3));
    }

    #[test]
    fn offsets_stay_on_char_boundaries_for_multibyte_text() {
        let found = find_case_insensitive("안녕 ÄPFEL", "äpfel").unwrap();
        assert_eq!(&"안녕 ÄPFEL"[found], "ÄPFEL");
        assert_eq!(find_case_insensitive("short", "longer needle"), None);
    }

    #[test]
    fn snippet_trims_context_by_chars() {
        let text = "0123456789abcdefghij MATCH 0123456789012345678901234567890".to_string();
        let start = text.find("MATCH").unwrap();
        let result = SearchResult {
            id: MessageId::new_v7(),
            role: Role::Assistant,
            text: text.clone(),
            start,
            end: start + "MATCH".len(),
        };

        let snippet = result.snippet();
        assert_eq!(snippet.before, "9abcdefghij ");
        assert_eq!(snippet.matched, "MATCH");
        assert_eq!(snippet.after.chars().count(), SNIPPET_CHARS_AFTER);
    }

    #[test]
    fn highlight_splits_bubble_text() {
        let spans = highlight("Say Hello twice", "hello").unwrap();
        assert_eq!(spans.before, "Say ");
        assert_eq!(spans.matched, "Hello");
        assert_eq!(spans.after, " twice");
        assert_eq!(highlight("", "x"), None);
        assert_eq!(highlight("text", " "), None);
        assert_eq!(highlight("text", "zzz"), None);
    }

    #[test]
    fn summary_reflects_query_state() {
        assert_eq!(summary("", 0), "Type a keyword to search the conversation.");
        assert_eq!(summary("a", 1), "1 result");
        assert_eq!(summary("a", 3), "3 results");
    }
}
