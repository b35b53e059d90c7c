//! Roleplay session command and query handlers.
//!
//! These handlers are the session boundary: each one loads a
//! `ConversationState` from the store, applies one operation, and writes
//! it back. Handlers that share a `SessionLocks` never interleave on the
//! same session.

mod end_session;
mod errors;
mod get_session;
mod reset_session;
mod send_message;
mod session_locks;
mod settings;
mod start_session;

pub use end_session::{EndSessionHandler, EndSessionResult};
pub use errors::RoleplayError;
pub use get_session::{GetSessionHandler, SessionSnapshot};
pub use reset_session::{ResetSessionCommand, ResetSessionHandler, ResetSessionResult, ResetTarget};
pub use send_message::{SendMessageCommand, SendMessageError, SendMessageHandler, SendMessageResult};
pub use session_locks::SessionLocks;
pub use settings::RoleplaySettings;
pub use start_session::{StartSessionHandler, StartSessionResult};
