//! StartSessionHandler - Command handler for opening a roleplay.

use std::sync::Arc;

use crate::domain::conversation::{ConversationState, Stage};
use crate::domain::foundation::SessionId;
use crate::ports::SessionStore;

use super::errors::RoleplayError;
use super::settings::RoleplaySettings;

/// Result of starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionResult {
    pub session_id: SessionId,
    pub stage: Stage,
    /// Greeting to show the user. It is not recorded in history.
    pub opening_message: String,
}

/// Handler for starting sessions.
pub struct StartSessionHandler {
    store: Arc<dyn SessionStore>,
    settings: RoleplaySettings,
}

impl StartSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>, settings: RoleplaySettings) -> Self {
        Self { store, settings }
    }

    pub async fn handle(&self) -> Result<StartSessionResult, RoleplayError> {
        let session_id = SessionId::new();
        let state = ConversationState::new(session_id, self.settings.history_window);
        let stage = state.stage();

        self.store.put(session_id, state).await?;

        tracing::info!(session_id = %session_id, "Roleplay session started");

        Ok(StartSessionResult {
            session_id,
            stage,
            opening_message: stage.opening_message().to_string(),
        })
    }
}
