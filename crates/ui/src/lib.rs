#![deny(unsafe_code)]

/// Application shell: top bar, history sidebar and the chat column.
pub mod app;
/// Chat components and the coordinator that drives `mimic_chat::ChatState`.
pub mod chat;
pub mod theme;
