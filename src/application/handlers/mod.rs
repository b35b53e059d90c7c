//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod roleplay;

pub use roleplay::{
    EndSessionHandler, EndSessionResult, GetSessionHandler, ResetSessionCommand,
    ResetSessionHandler, ResetSessionResult, ResetTarget, RoleplayError, RoleplaySettings,
    SendMessageCommand, SendMessageError, SendMessageHandler, SendMessageResult,
    SessionLocks, SessionSnapshot, StartSessionHandler, StartSessionResult,
};
