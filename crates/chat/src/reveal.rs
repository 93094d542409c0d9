use crate::ids::{MessageId, StreamSessionId};

/// Typewriter state for one assistant reply.
///
/// The visible prefix always ends on a char boundary and only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    message_id: MessageId,
    session_id: StreamSessionId,
    full_text: String,
    visible_bytes: usize,
}

impl Reveal {
    pub fn new(
        message_id: MessageId,
        session_id: StreamSessionId,
        full_text: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            session_id,
            full_text: full_text.into(),
            visible_bytes: 0,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn session_id(&self) -> StreamSessionId {
        self.session_id
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn visible(&self) -> &str {
        &self.full_text[..self.visible_bytes]
    }

    pub fn is_complete(&self) -> bool {
        self.visible_bytes >= self.full_text.len()
    }

    /// Extends the visible prefix by up to `chars` characters and returns the new prefix.
    ///
    /// A speed of zero still reveals one character so a reply always finishes.
    pub fn advance(&mut self, chars: usize) -> &str {
        let remaining = &self.full_text[self.visible_bytes..];
        let step = remaining
            .char_indices()
            .nth(chars.max(1))
            .map(|(offset, _)| offset)
            .unwrap_or(remaining.len());
        self.visible_bytes += step;
        self.visible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reveal(text: &str) -> Reveal {
        Reveal::new(MessageId::new_v7(), StreamSessionId::new(1), text)
    }

    #[test]
    fn advances_one_char_per_tick_until_complete() {
        let mut reveal = reveal("hey");
        assert_eq!(reveal.visible(), "");
        assert_eq!(reveal.advance(1), "h");
        assert_eq!(reveal.advance(1), "he");
        assert!(!reveal.is_complete());
        assert_eq!(reveal.advance(1), "hey");
        assert!(reveal.is_complete());
        assert_eq!(reveal.advance(1), "hey");
    }

    #[test]
    fn multibyte_text_never_splits_a_char() {
        let mut reveal = reveal("안녕하세요");
        assert_eq!(reveal.advance(1), "안");
        assert_eq!(reveal.advance(2), "안녕하");
        assert_eq!(reveal.advance(5), "안녕하세요");
        assert!(reveal.is_complete());
    }

    #[test]
    fn empty_text_is_complete_before_any_tick() {
        let reveal = reveal("");
        assert!(reveal.is_complete());
    }

    #[test]
    fn zero_speed_still_reveals_one_char_per_tick() {
        let mut reveal = reveal("ok");
        assert_eq!(reveal.advance(0), "o");
        assert_eq!(reveal.advance(0), "ok");
        assert!(reveal.is_complete());
    }
}
