//! Per-turn limits shared by the roleplay handlers.

use std::time::Duration;

use crate::config::AppConfig;
use crate::domain::conversation::{DEFAULT_HISTORY_WINDOW, DEFAULT_MAX_FIELD_CHARS};

/// Limits and sampling settings applied to every session.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleplaySettings {
    /// Turns kept in each session's history window.
    pub history_window: usize,
    /// Characters kept when storing an extracted field.
    pub max_field_chars: usize,
    /// Longest user message accepted.
    pub max_message_chars: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Outer bound on one LLM call, on top of the HTTP client timeout.
    pub llm_timeout: Duration,
}

impl RoleplaySettings {
    /// Builds settings from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            history_window: config.conversation.history_window,
            max_field_chars: config.conversation.max_field_chars,
            max_message_chars: config.conversation.max_message_chars,
            temperature: config.ai.temperature,
            max_tokens: config.ai.max_tokens,
            llm_timeout: config.ai.timeout(),
        }
    }
}

impl Default for RoleplaySettings {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            max_field_chars: DEFAULT_MAX_FIELD_CHARS,
            max_message_chars: 2000,
            temperature: 0.7,
            max_tokens: 300,
            llm_timeout: Duration::from_secs(30),
        }
    }
}
