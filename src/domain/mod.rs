//! Domain layer containing the roleplay business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, state machine trait, errors)
//! - `conversation` - Stage machine, field extraction and completion heuristic

pub mod conversation;
pub mod foundation;
