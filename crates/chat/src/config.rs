use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::attachment::MAX_PENDING_ATTACHMENTS;
use crate::error::{ConfigResult, ExtractSnafu};
use crate::history::HISTORY_LIMIT;
use crate::reply::{DEFAULT_FALLBACK_REPLY, ReplyRule, ReplyTable, default_reply_rules};

pub const CONFIG_DIRECTORY_NAME: &str = "mimic";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_GREETING: &str = "Hello! I am a dummy AI chatbot. How can I help you?";
pub const DEFAULT_REPLY_DELAY_MS: u64 = 500;
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 12;
pub const DEFAULT_CHARS_PER_TICK: usize = 1;
pub const DEFAULT_HIGHLIGHT_MS: u64 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Light,
    Dark,
}

impl ThemeChoice {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Read-only tuning for one chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
    #[serde(default = "default_reply_rules")]
    pub replies: Vec<ReplyRule>,
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,
    #[serde(default = "default_chars_per_tick")]
    pub chars_per_tick: usize,
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub theme: ThemeChoice,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            fallback_reply: default_fallback_reply(),
            replies: default_reply_rules(),
            reply_delay_ms: default_reply_delay_ms(),
            reveal_interval_ms: default_reveal_interval_ms(),
            chars_per_tick: default_chars_per_tick(),
            highlight_ms: default_highlight_ms(),
            max_attachments: default_max_attachments(),
            history_limit: default_history_limit(),
            theme: ThemeChoice::default(),
        }
    }
}

impl ChatConfig {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(CONFIG_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".mimic"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Loads the default config file, falling back to built-in values on any problem.
    pub fn load() -> Self {
        Self::load_or_default(&Self::default_config_path())
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("chat config not found at {:?}, using defaults", path);
            return Self::default();
        }

        let config = match Self::extract(path) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!("failed to load chat config: {}. using defaults", error);
                return Self::default();
            }
        };

        // A table that does not compile would leave the chat unable to answer.
        if let Err(error) = config.reply_table() {
            tracing::warn!("{}. using built-in reply table", error);
            return Self {
                replies: default_reply_rules(),
                ..config
            };
        }

        tracing::info!(
            path = %path.display(),
            reply_rules = config.replies.len(),
            "loaded chat config"
        );
        config
    }

    pub fn extract(path: &Path) -> ConfigResult<Self> {
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Json::file(path))
            .extract::<Self>()
            .context(ExtractSnafu {
                stage: "extract-chat-config",
                path: path.to_path_buf(),
            })?;
        Ok(config.normalized())
    }

    pub fn reply_table(&self) -> ConfigResult<ReplyTable> {
        ReplyTable::compile(&self.replies, self.fallback_reply.clone())
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    /// Restores defaults for values that would stall or disable the chat.
    ///
    /// Attachment and history limits are also capped at 5 and 10.
    pub fn normalized(mut self) -> Self {
        if self.greeting.trim().is_empty() {
            self.greeting = default_greeting();
        }
        if self.fallback_reply.trim().is_empty() {
            self.fallback_reply = default_fallback_reply();
        }
        if self.reveal_interval_ms == 0 {
            self.reveal_interval_ms = default_reveal_interval_ms();
        }
        if self.chars_per_tick == 0 {
            self.chars_per_tick = default_chars_per_tick();
        }
        if self.max_attachments == 0 {
            self.max_attachments = default_max_attachments();
        }
        self.max_attachments = self.max_attachments.min(MAX_PENDING_ATTACHMENTS);
        if self.history_limit == 0 {
            self.history_limit = default_history_limit();
        }
        self.history_limit = self.history_limit.min(HISTORY_LIMIT);
        self.replies
            .retain(|rule| !rule.pattern.trim().is_empty() && !rule.response.is_empty());

        self
    }
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_fallback_reply() -> String {
    DEFAULT_FALLBACK_REPLY.to_string()
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}

fn default_reveal_interval_ms() -> u64 {
    DEFAULT_REVEAL_INTERVAL_MS
}

fn default_chars_per_tick() -> usize {
    DEFAULT_CHARS_PER_TICK
}

fn default_highlight_ms() -> u64 {
    DEFAULT_HIGHLIGHT_MS
}

fn default_max_attachments() -> usize {
    MAX_PENDING_ATTACHMENTS
}

fn default_history_limit() -> usize {
    HISTORY_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChatConfig::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(config, ChatConfig::default());
        assert_eq!(config.reply_delay(), Duration::from_millis(500));
        assert_eq!(config.reveal_interval(), Duration::from_millis(12));
        assert_eq!(config.highlight_duration(), Duration::from_millis(900));
    }

    #[test]
    fn file_values_override_defaults() {
        let (_dir, path) = write_config(
            r#"{
                "greeting": "yo",
                "reveal_interval_ms": 30,
                "theme": "dark",
                "replies": [{ "pattern": "^ping$", "response": "pong" }]
            }"#,
        );

        let config = ChatConfig::extract(&path).unwrap();
        assert_eq!(config.greeting, "yo");
        assert_eq!(config.reveal_interval_ms, 30);
        assert_eq!(config.theme, ThemeChoice::Dark);
        assert_eq!(config.reply_delay_ms, DEFAULT_REPLY_DELAY_MS);
        assert_eq!(config.reply_table().unwrap().select("PING"), "pong");
    }

    #[test]
    fn zero_values_are_normalized() {
        let (_dir, path) = write_config(
            r#"{ "chars_per_tick": 0, "history_limit": 0, "max_attachments": 0, "greeting": " " }"#,
        );

        let config = ChatConfig::extract(&path).unwrap();
        assert_eq!(config.chars_per_tick, DEFAULT_CHARS_PER_TICK);
        assert_eq!(config.history_limit, HISTORY_LIMIT);
        assert_eq!(config.max_attachments, MAX_PENDING_ATTACHMENTS);
        assert_eq!(config.greeting, DEFAULT_GREETING);
    }

    #[test]
    fn limits_above_the_caps_are_clamped() {
        let (_dir, path) = write_config(r#"{ "max_attachments": 8, "history_limit": 25 }"#);

        let config = ChatConfig::load_or_default(&path);
        assert_eq!(config.max_attachments, MAX_PENDING_ATTACHMENTS);
        assert_eq!(config.history_limit, HISTORY_LIMIT);

        let smaller = ChatConfig {
            max_attachments: 2,
            history_limit: 3,
            ..ChatConfig::default()
        }
        .normalized();
        assert_eq!(smaller.max_attachments, 2);
        assert_eq!(smaller.history_limit, 3);
    }

    #[test]
    fn broken_json_falls_back_to_defaults() {
        let (_dir, path) = write_config("{ not json");
        assert!(ChatConfig::extract(&path).is_err());
        assert_eq!(ChatConfig::load_or_default(&path), ChatConfig::default());
    }

    #[test]
    fn invalid_reply_pattern_keeps_other_settings() {
        let (_dir, path) = write_config(
            r#"{ "greeting": "custom", "replies": [{ "pattern": "(", "response": "x" }] }"#,
        );

        let config = ChatConfig::load_or_default(&path);
        assert_eq!(config.greeting, "custom");
        assert_eq!(config.replies, default_reply_rules());
    }

    #[test]
    fn theme_toggles_between_light_and_dark() {
        assert_eq!(ThemeChoice::Light.toggled(), ThemeChoice::Dark);
        assert!(ThemeChoice::Light.toggled().is_dark());
        assert_eq!(ThemeChoice::Dark.toggled(), ThemeChoice::Light);
    }
}
