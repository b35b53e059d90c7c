//! Per-session roleplay state.
//!
//! `ConversationState` is the stage machine: it tracks the active stage,
//! the bounded history, and the facts extracted so far. It owns no I/O;
//! the session boundary loads it from a store, mutates a copy for one
//! turn and writes it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{SessionId, StateMachine, ValidationError};

use super::extracted::ExtractedFields;
use super::history::{History, Turn, TurnRole};
use super::prompts::system_prompt;
use super::stage::Stage;

/// Full state of one roleplay session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    session_id: SessionId,
    stage: Stage,
    history: History,
    extracted: ExtractedFields,
    /// User turns recorded while each stage was active.
    stage_turns: BTreeMap<Stage, u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationState {
    /// Creates a fresh state in the intent stage.
    pub fn new(session_id: SessionId, history_window: usize) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            stage: Stage::Intent,
            history: History::new(history_window),
            extracted: ExtractedFields::new(),
            stage_turns: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn extracted(&self) -> &ExtractedFields {
        &self.extracted
    }

    /// Mutable access for the field extractor.
    pub fn extracted_mut(&mut self) -> &mut ExtractedFields {
        &mut self.extracted
    }

    /// Number of user turns recorded in `stage`.
    pub fn turns_in(&self, stage: Stage) -> u32 {
        self.stage_turns.get(&stage).copied().unwrap_or(0)
    }

    pub fn stage_turns(&self) -> &BTreeMap<Stage, u32> {
        &self.stage_turns
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ════════════════════════════════════════════════════════════════════════
    // Stage machine operations
    // ════════════════════════════════════════════════════════════════════════

    /// Builds the system prompt for the active stage.
    pub fn current_prompt(&self) -> String {
        system_prompt(self.stage, &self.extracted)
    }

    /// Appends a turn to the history, trimming to the window.
    pub fn record_turn(&mut self, role: TurnRole, text: impl Into<String>) {
        self.history.push(Turn::new(role, text, self.stage));
        if role == TurnRole::User {
            *self.stage_turns.entry(self.stage).or_insert(0) += 1;
        }
        self.touch();
    }

    /// Moves to the next stage. Returns false at `Pitch`.
    pub fn advance(&mut self) -> bool {
        if self.stage.is_terminal() {
            return false;
        }
        let Some(next) = self.stage.next() else {
            return false;
        };
        let next = match self.stage.transition_to(next) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(session_id = %self.session_id, error = %err, "Stage transition rejected");
                return false;
            }
        };

        tracing::info!(
            session_id = %self.session_id,
            from = %self.stage,
            to = %next,
            turns_in_stage = self.turns_in(self.stage),
            "Advancing roleplay stage"
        );

        self.stage = next;
        self.touch();
        true
    }

    /// Moves back to an earlier stage.
    ///
    /// Fields owned by `target` and every later stage are cleared so they
    /// can be collected again. History and turn counters are kept.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` if `target` is not strictly
    /// earlier than the current stage.
    pub fn rewind_to(&mut self, target: Stage) -> Result<(), ValidationError> {
        if target >= self.stage {
            return Err(ValidationError::invalid_format(
                "stage",
                format!("cannot rewind from {} to {}", self.stage, target),
            ));
        }

        for stage in Stage::ALL.into_iter().filter(|s| *s >= target) {
            self.extracted.clear_stage(stage);
        }

        tracing::info!(
            session_id = %self.session_id,
            from = %self.stage,
            to = %target,
            "Rewinding roleplay stage"
        );

        self.stage = target;
        self.touch();
        Ok(())
    }

    /// Returns to a fresh intent state, keeping the id and window.
    pub fn reset(&mut self) {
        self.stage = Stage::Intent;
        self.history.clear();
        self.extracted = ExtractedFields::new();
        self.stage_turns.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state() -> ConversationState {
        ConversationState::new(SessionId::new(), 4)
    }

    mod construction {
        use super::*;

        #[test]
        fn new_state_starts_at_intent() {
            let s = state();
            assert_eq!(s.stage(), Stage::Intent);
            assert!(s.history().is_empty());
            assert!(s.extracted().is_empty());
            assert_eq!(s.turns_in(Stage::Intent), 0);
        }

        #[test]
        fn prompt_tracks_active_stage() {
            let mut s = state();
            assert!(s.current_prompt().contains("STAGE: INTENT"));
            s.advance();
            assert!(s.current_prompt().contains("STAGE: LOGICAL"));
        }

        #[test]
        fn prompt_includes_extracted_fields() {
            let mut s = state();
            s.extracted_mut().set_desired_outcome("I want more leads");
            assert!(s.current_prompt().contains("I want more leads"));
        }
    }

    mod turns {
        use super::*;

        #[test]
        fn user_turns_are_counted_per_stage() {
            let mut s = state();
            s.record_turn(TurnRole::User, "hi");
            s.record_turn(TurnRole::Assistant, "hello");
            s.advance();
            s.record_turn(TurnRole::User, "more");
            s.record_turn(TurnRole::User, "again");

            assert_eq!(s.turns_in(Stage::Intent), 1);
            assert_eq!(s.turns_in(Stage::Logical), 2);
        }

        #[test]
        fn turns_are_tagged_with_stage() {
            let mut s = state();
            s.record_turn(TurnRole::User, "hi");
            s.advance();
            s.record_turn(TurnRole::User, "next");
            let stages: Vec<_> = s.history().iter().map(|t| t.stage).collect();
            assert_eq!(stages, vec![Stage::Intent, Stage::Logical]);
        }

        #[test]
        fn history_keeps_most_recent_window() {
            let mut s = state();
            for i in 0..6 {
                s.record_turn(TurnRole::User, format!("m{i}"));
            }
            let contents: Vec<_> = s.history().iter().map(|t| t.content.as_str()).collect();
            assert_eq!(contents, vec!["m2", "m3", "m4", "m5"]);
        }
    }

    mod advancing {
        use super::*;

        #[test]
        fn advance_walks_every_stage_then_stops() {
            let mut s = state();
            assert!(s.advance());
            assert!(s.advance());
            assert!(s.advance());
            assert_eq!(s.stage(), Stage::Pitch);
            assert!(!s.advance());
            assert_eq!(s.stage(), Stage::Pitch);
        }

        #[test]
        fn advance_keeps_extracted_fields() {
            let mut s = state();
            s.extracted_mut().set_desired_outcome("outcome");
            s.advance();
            s.advance();
            assert_eq!(s.extracted().desired_outcome.as_deref(), Some("outcome"));
        }
    }

    mod rewinding {
        use super::*;

        fn at_pitch_with_everything() -> ConversationState {
            let mut s = state();
            s.extracted_mut().set_desired_outcome("outcome");
            s.extracted_mut().set_problem("problem");
            s.extracted_mut().add_goal("goal");
            s.advance();
            s.advance();
            s.advance();
            s
        }

        #[test]
        fn rewind_clears_target_and_later_fields() {
            let mut s = at_pitch_with_everything();
            s.rewind_to(Stage::Logical).unwrap();

            assert_eq!(s.stage(), Stage::Logical);
            assert_eq!(s.extracted().desired_outcome.as_deref(), Some("outcome"));
            assert!(s.extracted().problem.is_none());
            assert!(s.extracted().goals.is_empty());
        }

        #[test]
        fn rewind_to_current_or_later_fails() {
            let mut s = state();
            s.advance();
            assert!(s.rewind_to(Stage::Logical).is_err());
            assert!(s.rewind_to(Stage::Pitch).is_err());
            assert_eq!(s.stage(), Stage::Logical);
        }

        #[test]
        fn reset_returns_to_fresh_intent() {
            let mut s = at_pitch_with_everything();
            let id = s.session_id();
            s.record_turn(TurnRole::User, "hi");
            s.reset();

            assert_eq!(s.session_id(), id);
            assert_eq!(s.stage(), Stage::Intent);
            assert!(s.history().is_empty());
            assert!(s.extracted().is_empty());
            assert!(s.stage_turns().is_empty());
            assert_eq!(s.history().window(), 4);
        }
    }

    mod properties {
        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            User(String),
            Assistant(String),
            Advance,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                "[a-z ]{0,20}".prop_map(Op::User),
                "[a-z ]{0,20}".prop_map(Op::Assistant),
                Just(Op::Advance),
            ]
        }

        proptest! {
            #[test]
            fn stage_never_moves_backward(ops in proptest::collection::vec(op(), 0..60)) {
                let mut s = state();
                let mut previous = s.stage();
                for op in ops {
                    match op {
                        Op::User(text) => s.record_turn(TurnRole::User, text),
                        Op::Assistant(text) => s.record_turn(TurnRole::Assistant, text),
                        Op::Advance => { s.advance(); }
                    }
                    prop_assert!(s.stage() >= previous);
                    previous = s.stage();
                }
            }

            #[test]
            fn history_never_exceeds_window(window in 1usize..10, count in 0usize..40) {
                let mut s = ConversationState::new(SessionId::new(), window);
                for i in 0..count {
                    s.record_turn(TurnRole::User, i.to_string());
                    prop_assert!(s.history().len() <= window);
                }
                prop_assert_eq!(s.history().len(), count.min(window));
            }
        }
    }
}
