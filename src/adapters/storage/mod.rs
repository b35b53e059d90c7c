//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! - **InMemorySessionStore** - Process-local map (default, also used in tests)

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;
