//! In-Memory Session Store Adapter
//!
//! Keeps roleplay state in a process-local map. State is lost on exit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::SessionId;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory storage for roleplay sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, ConversationState>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Clear all sessions (useful for tests)
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ConversationState>, SessionStoreError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn put(
        &self,
        session_id: SessionId,
        state: ConversationState,
    ) -> Result<(), SessionStoreError> {
        self.sessions.write().await.insert(session_id, state);
        Ok(())
    }

    async fn remove(&self, session_id: SessionId) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|_| ())
            .ok_or(SessionStoreError::NotFound(session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{Stage, TurnRole};

    fn test_state() -> ConversationState {
        ConversationState::new(SessionId::new(), 20)
    }

    #[tokio::test]
    async fn put_then_get_returns_state() {
        let store = InMemorySessionStore::new();
        let state = test_state();
        let id = state.session_id();

        store.put(id, state.clone()).await.unwrap();

        assert_eq!(store.get(id).await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn get_unknown_session_returns_none() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.get(SessionId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_replaces_previous_value() {
        let store = InMemorySessionStore::new();
        let mut state = test_state();
        let id = state.session_id();
        store.put(id, state.clone()).await.unwrap();

        state.record_turn(TurnRole::User, "Hello");
        state.advance();
        store.put(id, state).await.unwrap();

        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.stage(), Stage::Logical);
        assert_eq!(loaded.history().len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn remove_deletes_session() {
        let store = InMemorySessionStore::new();
        let state = test_state();
        let id = state.session_id();
        store.put(id, state).await.unwrap();

        store.remove(id).await.unwrap();

        assert!(store.is_empty().await);
        assert_eq!(
            store.remove(id).await,
            Err(SessionStoreError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn clones_share_sessions() {
        let store = InMemorySessionStore::new();
        let other = store.clone();
        let state = test_state();
        let id = state.session_id();

        let handle = tokio::spawn(async move { other.put(id, state).await.unwrap() });
        handle.await.unwrap();

        assert!(store.get(id).await.unwrap().is_some());
        store.clear().await;
        assert!(store.is_empty().await);
    }
}
