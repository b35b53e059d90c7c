//! ResetSessionHandler - Command handler for restarting or rewinding a roleplay.

use std::sync::Arc;

use crate::domain::conversation::Stage;
use crate::domain::foundation::SessionId;
use crate::ports::SessionStore;

use super::errors::RoleplayError;
use super::session_locks::SessionLocks;

/// How far back to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTarget {
    /// Clear everything and start again at intent.
    Restart,
    /// Return to an earlier stage, keeping findings from stages before it.
    RewindTo(Stage),
}

/// Command to reset a session.
#[derive(Debug, Clone)]
pub struct ResetSessionCommand {
    pub session_id: SessionId,
    pub target: ResetTarget,
}

/// Result of a reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSessionResult {
    pub stage: Stage,
    /// Greeting for the stage the session resumes in.
    pub opening_message: String,
}

/// Handler for resetting sessions.
pub struct ResetSessionHandler {
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
}

impl ResetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            locks: SessionLocks::new(),
        }
    }

    /// Shares turn locks so a reset waits for an in-flight turn.
    pub fn with_locks(mut self, locks: SessionLocks) -> Self {
        self.locks = locks;
        self
    }

    pub async fn handle(&self, cmd: ResetSessionCommand) -> Result<ResetSessionResult, RoleplayError> {
        let session_id = cmd.session_id;
        let guard = self.locks.acquire(session_id).await;
        let result = self.apply(cmd).await;
        drop(guard);
        self.locks.release(session_id).await;
        result
    }

    async fn apply(&self, cmd: ResetSessionCommand) -> Result<ResetSessionResult, RoleplayError> {
        let mut state = self
            .store
            .get(cmd.session_id)
            .await?
            .ok_or(RoleplayError::SessionNotFound(cmd.session_id))?;

        match cmd.target {
            ResetTarget::Restart => {
                state.reset();
                tracing::info!(session_id = %cmd.session_id, "Roleplay session restarted");
            }
            ResetTarget::RewindTo(stage) => state.rewind_to(stage)?,
        }

        let stage = state.stage();
        self.store.put(cmd.session_id, state).await?;

        Ok(ResetSessionResult {
            stage,
            opening_message: stage.opening_message().to_string(),
        })
    }
}
