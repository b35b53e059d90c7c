//! EndSessionHandler - Command handler for closing a roleplay.

use std::sync::Arc;

use crate::domain::conversation::Stage;
use crate::domain::foundation::SessionId;
use crate::ports::SessionStore;

use super::errors::RoleplayError;
use super::session_locks::SessionLocks;

/// Summary of a session that was ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndSessionResult {
    pub session_id: SessionId,
    pub final_stage: Stage,
    /// User turns across every stage.
    pub user_turns: u32,
}

/// Handler for ending sessions.
pub struct EndSessionHandler {
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
}

impl EndSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            locks: SessionLocks::new(),
        }
    }

    /// Shares turn locks so ending waits for an in-flight turn.
    pub fn with_locks(mut self, locks: SessionLocks) -> Self {
        self.locks = locks;
        self
    }

    pub async fn handle(&self, session_id: SessionId) -> Result<EndSessionResult, RoleplayError> {
        let guard = self.locks.acquire(session_id).await;
        let result = self.close(session_id).await;
        drop(guard);
        self.locks.release(session_id).await;
        result
    }

    async fn close(&self, session_id: SessionId) -> Result<EndSessionResult, RoleplayError> {
        let state = self
            .store
            .get(session_id)
            .await?
            .ok_or(RoleplayError::SessionNotFound(session_id))?;

        self.store.remove(session_id).await?;

        let user_turns: u32 = state.stage_turns().values().sum();
        tracing::info!(
            session_id = %session_id,
            final_stage = %state.stage(),
            user_turns,
            "Roleplay session ended"
        );

        Ok(EndSessionResult {
            session_id,
            final_stage: state.stage(),
            user_turns,
        })
    }
}
