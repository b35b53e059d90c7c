//! Bounded conversation history.
//!
//! Keeps the most recent turns of a roleplay so the payload sent to the
//! LLM stays small. The system prompt is never stored here; it is rebuilt
//! from the stage on every turn, so trimming can only drop user and
//! assistant turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::stage::Stage;

/// Default number of turns kept in the window.
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// The trainee playing the prospect.
    User,
    /// The AI coach.
    Assistant,
}

/// A single recorded message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    /// Stage active when the turn was recorded.
    pub stage: Stage,
    pub recorded_at: DateTime<Utc>,
}

impl Turn {
    /// Creates a turn stamped with the current time.
    pub fn new(role: TurnRole, content: impl Into<String>, stage: Stage) -> Self {
        Self {
            role,
            content: content.into(),
            stage,
            recorded_at: Utc::now(),
        }
    }
}

/// FIFO window of the most recent turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    turns: VecDeque<Turn>,
    window: usize,
}

impl History {
    /// Creates an empty history keeping at most `window` turns.
    ///
    /// A window of zero is treated as one so the latest turn is always kept.
    pub fn new(window: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            window: window.max(1),
        }
    }

    /// Appends a turn, evicting the oldest entries beyond the window.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.window {
            self.turns.pop_front();
        }
    }

    /// Iterates turns oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Removes every turn but keeps the window size.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}
