use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{ConfigResult, InvalidReplyPatternSnafu};

pub const DEFAULT_FALLBACK_REPLY: &str = "Good question! I am only a dummy, though. \
Hook up a real model and I will get a lot smarter.";

/// One pattern/response pair as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRule {
    pub pattern: String,
    pub response: String,
}

impl ReplyRule {
    pub fn new(pattern: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            response: response.into(),
        }
    }
}

pub fn default_reply_rules() -> Vec<ReplyRule> {
    vec![
        ReplyRule::new(
            "(hello|hi|안녕)",
            "Hello! What shall we build today?",
        ),
        ReplyRule::new(
            "help|도움|사용법",
            "Type a question in the box below and press Enter. \
Later you can wire /api/chat to a real backend.",
        ),
        ReplyRule::new(
            "api|연결|백엔드|서버",
            "Later, just point the fetch('/api/chat') call at a real endpoint. \
A body shaped like {messages:[...]} is recommended!",
        ),
        ReplyRule::new(
            "react|리액트|rust|gpui",
            "This view keeps its state in a plain reducer, so it drops into any window as-is.",
        ),
        ReplyRule::new(
            "bookbridge|북브릿지|공지|폼|datepicker|카카오",
            "It ports easily to a BookBridge-style page too. \
Keep the UI and swap only the reply source for a real API.",
        ),
    ]
}

#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    response: String,
}

/// Ordered canned-reply lookup. First matching rule wins.
#[derive(Debug, Clone)]
pub struct ReplyTable {
    rules: Vec<CompiledRule>,
    fallback: String,
}

impl ReplyTable {
    pub fn compile(rules: &[ReplyRule], fallback: impl Into<String>) -> ConfigResult<Self> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let pattern = RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .context(InvalidReplyPatternSnafu {
                        stage: "compile-reply-table",
                        index,
                        pattern: rule.pattern.clone(),
                    })?;
                Ok(CompiledRule {
                    pattern,
                    response: rule.response.clone(),
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            rules,
            fallback: fallback.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Picks the reply for raw user input.
    pub fn select(&self, input: &str) -> &str {
        let normalized = input.trim().to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(&normalized))
            .map(|rule| rule.response.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

impl Default for ReplyTable {
    fn default() -> Self {
        // Built-in patterns are literal alternations and always compile.
        Self::compile(&default_reply_rules(), DEFAULT_FALLBACK_REPLY).unwrap_or_else(|_| Self {
            rules: Vec::new(),
            fallback: DEFAULT_FALLBACK_REPLY.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn greeting_matches_case_insensitively() {
        let table = ReplyTable::default();
        assert_eq!(table.select("hi"), "Hello! What shall we build today?");
        assert_eq!(table.select("  HELLO there "), "Hello! What shall we build today?");
        assert_eq!(table.select("안녕하세요"), "Hello! What shall we build today?");
    }

    #[test]
    fn first_matching_rule_wins() {
        // "hi" and "help" both match; greeting is listed first.
        let table = ReplyTable::default();
        assert_eq!(table.select("hi, help me"), "Hello! What shall we build today?");
        assert!(table.select("what about the api?").contains("{messages:[...]}"));
    }

    #[test]
    fn unmatched_input_uses_fallback() {
        let table = ReplyTable::compile(&[ReplyRule::new("^ping$", "pong")], "shrug").unwrap();
        assert_eq!(table.select("Ping"), "pong");
        assert_eq!(table.select("pingpong"), "shrug");
        assert_eq!(table.select(""), "shrug");
    }

    #[test]
    fn invalid_pattern_reports_its_index() {
        let rules = [ReplyRule::new("ok", "fine"), ReplyRule::new("(unclosed", "never")];
        let error = ReplyTable::compile(&rules, "fallback").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidReplyPattern { index: 1, .. }));
    }
}
