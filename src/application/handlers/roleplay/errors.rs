//! Errors shared by the session lifecycle handlers.

use thiserror::Error;

use crate::domain::foundation::{SessionId, ValidationError};
use crate::ports::SessionStoreError;

/// Errors from starting, resetting, reading or ending a session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoleplayError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Invalid rewind: {0}")]
    InvalidRewind(#[from] ValidationError),

    #[error("Session store error: {0}")]
    Store(SessionStoreError),
}

impl From<SessionStoreError> for RoleplayError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => RoleplayError::SessionNotFound(id),
            other => RoleplayError::Store(other),
        }
    }
}
