//! GetSessionHandler - Query handler for a read-only session snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::conversation::{ConversationState, ExtractedFields, Stage};
use crate::domain::foundation::SessionId;
use crate::ports::SessionStore;

use super::errors::RoleplayError;

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub stage: Stage,
    pub stage_turns: BTreeMap<Stage, u32>,
    pub extracted: ExtractedFields,
    /// Turns currently held in the history window.
    pub history_len: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ConversationState> for SessionSnapshot {
    fn from(state: &ConversationState) -> Self {
        Self {
            session_id: state.session_id(),
            stage: state.stage(),
            stage_turns: state.stage_turns().clone(),
            extracted: state.extracted().clone(),
            history_len: state.history().len(),
            created_at: state.created_at(),
            updated_at: state.updated_at(),
        }
    }
}

/// Handler for session snapshots.
pub struct GetSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl GetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, session_id: SessionId) -> Result<SessionSnapshot, RoleplayError> {
        self.store
            .get(session_id)
            .await?
            .map(|state| SessionSnapshot::from(&state))
            .ok_or(RoleplayError::SessionNotFound(session_id))
    }
}
