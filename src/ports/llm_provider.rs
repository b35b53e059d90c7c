//! LLM Provider Port - Interface for chat-completion integrations.
//!
//! This port abstracts the single outbound call the roleplay makes per turn,
//! so the session boundary can generate the coach's reply without coupling
//! to a specific vendor (OpenAI, Anthropic, or a scripted mock).
//!
//! # Design
//!
//! - Non-streaming completions only
//! - Provider-agnostic message format
//! - Errors grouped into user-facing categories via [`ProviderError::kind`]
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl LlmProvider for EchoProvider {
//!     async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
//!         Ok(CompletionResponse::new("Got it.", "echo"))
//!     }
//!
//!     fn provider_info(&self) -> ProviderInfo {
//!         ProviderInfo::new("echo", "echo-1")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::{Turn, TurnRole};

/// Port for LLM chat-completion calls.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generates one completion for the given prompt and history.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, ProviderError>;

    /// Returns provider name and model.
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Stage system prompt, sent ahead of the history.
    pub system_prompt: String,
    /// Windowed conversation history, oldest first.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Creates a request with no messages and neutral sampling settings.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
            temperature: 0.7,
            max_tokens: 300,
        }
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    /// Appends recorded turns as messages.
    pub fn with_turns<'a>(mut self, turns: impl IntoIterator<Item = &'a Turn>) -> Self {
        self.messages.extend(turns.into_iter().map(Message::from));
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        };
        Self::new(role, turn.content.clone())
    }
}

/// Role of the message sender.
///
/// The system prompt travels separately in [`CompletionRequest`], so there
/// is no system role here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Response from a chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated reply text.
    pub content: String,
    /// Model that generated the reply.
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// Creates a response with zero usage and a natural stop.
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit max_tokens limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
    /// Anything the provider reports that we do not recognize.
    Other,
}

/// Provider name and model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai", "anthropic").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Coarse grouping of provider failures, used to pick user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// Bad or missing credentials.
    Authentication,
    /// Quota or rate limit hit.
    RateLimit,
    /// Everything else: network, timeout, outage, malformed data.
    Transport,
}

impl ProviderErrorKind {
    /// Fixed message shown to the user in place of a reply.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Authentication => {
                "The coaching service is not configured correctly. Please check the API key and try again."
            }
            Self::RateLimit => {
                "The coaching service is busy right now. Please wait a moment and send your message again."
            }
            Self::Transport => {
                "I couldn't reach the coaching service. Please try sending your message again."
            }
        }
    }
}

/// LLM provider errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn timeout(timeout_secs: u32) -> Self {
        Self::Timeout { timeout_secs }
    }

    /// Timeout for a `Duration` limit, rounded up to whole seconds so
    /// sub-second limits never report zero.
    pub fn timed_out_after(limit: Duration) -> Self {
        let secs = limit.as_secs_f64().ceil();
        let timeout_secs = if secs >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            secs as u32
        };
        Self::timeout(timeout_secs)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Groups the error for user-facing reporting.
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::AuthenticationFailed => ProviderErrorKind::Authentication,
            Self::RateLimited { .. } => ProviderErrorKind::RateLimit,
            Self::Timeout { .. }
            | Self::Network(_)
            | Self::Unavailable { .. }
            | Self::InvalidRequest(_)
            | Self::Parse(_) => ProviderErrorKind::Transport,
        }
    }

    /// User-facing text for this failure.
    pub fn fallback_message(&self) -> &'static str {
        self.kind().fallback_message()
    }

    /// Returns true if a retry might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Unavailable { .. } | Self::Network(_) | Self::Timeout { .. }
        )
    }
}
