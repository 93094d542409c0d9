use std::fmt;

use uuid::Uuid;

// Every session-scoped token shares one shape, so the wrappers come from one macro.
macro_rules! define_token_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Wraps an existing UUID.
            pub fn new(raw: Uuid) -> Self {
                Self(raw)
            }

            /// Mints a fresh time-ordered token.
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self::new(value)
            }
        }
    };
}

define_token_id!(
    /// Identifier of one chat message, unique within the session.
    MessageId
);
define_token_id!(
    /// Identifier of one pending attachment, used to remove it before sending.
    AttachmentId
);

/// Identifier for one reply generation.
///
/// Changes on every send so timer callbacks for an older reply can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamSessionId(pub u64);

impl StreamSessionId {
    /// Wraps a raw session counter value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Highlight generation used to ignore expiries from superseded jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightToken(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_tokens_are_unique() {
        let first = MessageId::new_v7();
        let second = MessageId::new_v7();
        assert_ne!(first, second);
        assert_eq!(first.to_string(), first.as_uuid().to_string());
    }
}
