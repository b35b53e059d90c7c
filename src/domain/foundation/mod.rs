//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the state machine trait, and validation errors
//! that form the vocabulary of the roleplay domain.

mod errors;
mod ids;
mod state_machine;

pub use errors::ValidationError;
pub use ids::SessionId;
pub use state_machine::StateMachine;
