//! Session Store Port - Interface for holding roleplay state between turns.
//!
//! The session boundary loads a `ConversationState`, mutates a private copy
//! for one turn, and writes it back whole. Implementations only need to
//! store and return values; they never see partial updates.

use async_trait::async_trait;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::SessionId;

/// Errors that can occur during session store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("failed to serialize session: {0}")]
    Serialization(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Port for per-session state storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the state for a session.
    ///
    /// # Returns
    /// `None` if no session exists with that id
    async fn get(&self, session_id: SessionId)
        -> Result<Option<ConversationState>, SessionStoreError>;

    /// Store the state for a session, replacing any previous value.
    async fn put(
        &self,
        session_id: SessionId,
        state: ConversationState,
    ) -> Result<(), SessionStoreError>;

    /// Remove a session.
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no session exists
    async fn remove(&self, session_id: SessionId) -> Result<(), SessionStoreError>;
}
