//! Roleplay conversation limits

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::conversation::{DEFAULT_HISTORY_WINDOW, DEFAULT_MAX_FIELD_CHARS};

/// Conversation limits
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Turns kept in the history window sent to the LLM
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Characters kept when storing an extracted field
    #[serde(default = "default_max_field_chars")]
    pub max_field_chars: usize,

    /// Longest user message accepted
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl ConversationConfig {
    /// Validate conversation limits
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_window == 0 {
            return Err(ValidationError::MustBePositive("history_window"));
        }
        if self.max_field_chars == 0 {
            return Err(ValidationError::MustBePositive("max_field_chars"));
        }
        if self.max_message_chars == 0 {
            return Err(ValidationError::MustBePositive("max_message_chars"));
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_field_chars: default_max_field_chars(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_max_field_chars() -> usize {
    DEFAULT_MAX_FIELD_CHARS
}

fn default_max_message_chars() -> usize {
    2000
}
