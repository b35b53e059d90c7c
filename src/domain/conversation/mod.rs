//! Conversation domain module.
//!
//! Drives a sales roleplay through the intent, logical, emotional and
//! pitch stages: stage prompts, keyword extraction, and the completion
//! heuristic that decides when to move on.

mod extracted;
mod extractor;
mod heuristic;
mod history;
mod prompts;
mod stage;
mod state;

pub use extracted::ExtractedFields;
pub use extractor::{
    ExtractedField, ExtractionOutcome, ExtractorConfig, FieldExtractor, DEFAULT_MAX_FIELD_CHARS,
};
pub use heuristic::{CompletionHeuristic, HeuristicConfig};
pub use history::{History, Turn, TurnRole, DEFAULT_HISTORY_WINDOW};
pub use prompts::{stage_template, system_prompt};
pub use stage::Stage;
pub use state::ConversationState;
