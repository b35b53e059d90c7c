//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `LlmProvider` - Chat completion calls that generate the coach's replies
//! - `SessionStore` - Per-session roleplay state between turns

mod llm_provider;
mod session_store;

pub use llm_provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Message, MessageRole,
    ProviderError, ProviderErrorKind, ProviderInfo, TokenUsage,
};
pub use session_store::{SessionStore, SessionStoreError};
