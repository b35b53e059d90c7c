//! Stage completion heuristic.
//!
//! Decides after each assistant turn whether the conversation may move
//! to the next stage. Two signals must agree: the assistant's reply
//! contains one of the stage's acknowledgment phrases, and the user has
//! actually supplied the data that stage is after.

use super::extracted::ExtractedFields;
use super::stage::Stage;

/// Per-stage acknowledgment phrases looked for in assistant replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicConfig {
    pub intent_signals: Vec<String>,
    pub logical_signals: Vec<String>,
    pub emotional_signals: Vec<String>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            intent_signals: strings(&["got it", "makes sense", "understand what you", "clear on"]),
            logical_signals: strings(&["i see", "sounds like", "so the main", "that explains"]),
            emotional_signals: strings(&["i can tell", "that matters", "imagine", "i hear you"]),
        }
    }
}

impl HeuristicConfig {
    /// Signal phrases for `stage`. `Pitch` has none.
    pub fn signals_for(&self, stage: Stage) -> &[String] {
        match stage {
            Stage::Intent => &self.intent_signals,
            Stage::Logical => &self.logical_signals,
            Stage::Emotional => &self.emotional_signals,
            Stage::Pitch => &[],
        }
    }
}

/// Two-signal check gating `ConversationState::advance`.
#[derive(Debug, Clone, Default)]
pub struct CompletionHeuristic {
    config: HeuristicConfig,
}

impl CompletionHeuristic {
    /// Creates a heuristic with the given phrase tables.
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    /// Returns true only if the reply carries a signal phrase AND the
    /// stage's required fields are present.
    pub fn should_advance(
        &self,
        stage: Stage,
        assistant_reply: &str,
        extracted: &ExtractedFields,
    ) -> bool {
        self.has_signal_phrase(stage, assistant_reply) && extracted.is_sufficient_for(stage)
    }

    /// Returns true if the reply contains one of the stage's phrases.
    pub fn has_signal_phrase(&self, stage: Stage, assistant_reply: &str) -> bool {
        let lower = assistant_reply.to_lowercase();
        self.config
            .signals_for(stage)
            .iter()
            .any(|phrase| lower.contains(&phrase.to_lowercase()))
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
