//! Structured facts learned from the user during a roleplay.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::stage::Stage;

/// Fields extracted from user messages across all stages.
///
/// Scalars are write-once: the first qualifying message wins.
/// Sets deduplicate on the exact stored text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// What the user wants to achieve (intent stage).
    pub desired_outcome: Option<String>,
    /// How the user is tackling it today (logical stage).
    pub current_strategy: Option<String>,
    /// What is going wrong (logical stage).
    pub problem: Option<String>,
    /// What success would give them (emotional stage).
    pub goals: BTreeSet<String>,
    /// What happens if nothing changes (emotional stage).
    pub consequences: BTreeSet<String>,
}

impl ExtractedFields {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `desired_outcome` unless already set. Returns true if stored.
    pub fn set_desired_outcome(&mut self, value: impl Into<String>) -> bool {
        set_once(&mut self.desired_outcome, value.into())
    }

    /// Sets `current_strategy` unless already set. Returns true if stored.
    pub fn set_current_strategy(&mut self, value: impl Into<String>) -> bool {
        set_once(&mut self.current_strategy, value.into())
    }

    /// Sets `problem` unless already set. Returns true if stored.
    pub fn set_problem(&mut self, value: impl Into<String>) -> bool {
        set_once(&mut self.problem, value.into())
    }

    /// Adds a goal. Returns false if the exact text was already present.
    pub fn add_goal(&mut self, value: impl Into<String>) -> bool {
        self.goals.insert(value.into())
    }

    /// Adds a consequence. Returns false if the exact text was already present.
    pub fn add_consequence(&mut self, value: impl Into<String>) -> bool {
        self.consequences.insert(value.into())
    }

    /// Returns true if nothing has been extracted yet.
    pub fn is_empty(&self) -> bool {
        self.desired_outcome.is_none()
            && self.current_strategy.is_none()
            && self.problem.is_none()
            && self.goals.is_empty()
            && self.consequences.is_empty()
    }

    /// Returns true if the fields a stage needs before advancing are present.
    ///
    /// `Pitch` never has sufficient data since it is terminal.
    pub fn is_sufficient_for(&self, stage: Stage) -> bool {
        match stage {
            Stage::Intent => self.desired_outcome.is_some(),
            Stage::Logical => self.problem.is_some() || self.current_strategy.is_some(),
            Stage::Emotional => !self.goals.is_empty() || !self.consequences.is_empty(),
            Stage::Pitch => false,
        }
    }

    /// Clears the fields owned by `stage`.
    pub fn clear_stage(&mut self, stage: Stage) {
        match stage {
            Stage::Intent => self.desired_outcome = None,
            Stage::Logical => {
                self.current_strategy = None;
                self.problem = None;
            }
            Stage::Emotional => {
                self.goals.clear();
                self.consequences.clear();
            }
            Stage::Pitch => {}
        }
    }

    /// Serializes the record for prompt interpolation.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn set_once(slot: &mut Option<String>, value: String) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}
