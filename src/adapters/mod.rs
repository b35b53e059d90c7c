//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - LLM providers (OpenAI, Anthropic, mock)
//! - `storage` - Session stores (in-memory)

pub mod ai;
pub mod storage;

pub use ai::{provider_from_config, MockLlmProvider};
pub use storage::InMemorySessionStore;
