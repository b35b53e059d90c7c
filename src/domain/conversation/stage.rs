//! Persuasion stages of a roleplay conversation.
//!
//! Stages drive what the AI coach is trying to learn from the user.
//! They flow strictly forward: `Intent` → `Logical` → `Emotional` → `Pitch`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// The current persuasion stage of a conversation.
///
/// Ordering follows the framework, so `Stage::Intent < Stage::Pitch`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Discover what the user wants to achieve.
    #[default]
    Intent,

    /// Understand the current approach and what is not working.
    Logical,

    /// Surface goals and the cost of inaction.
    Emotional,

    /// Present the offer. Terminal: no further automatic transitions.
    Pitch,
}

impl Stage {
    /// All stages in framework order.
    pub const ALL: [Stage; 4] = [Stage::Intent, Stage::Logical, Stage::Emotional, Stage::Pitch];

    /// Returns the stage that follows this one, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Intent => Some(Self::Logical),
            Self::Logical => Some(Self::Emotional),
            Self::Emotional => Some(Self::Pitch),
            Self::Pitch => None,
        }
    }

    /// Snake-case name used in config and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Logical => "logical",
            Self::Emotional => "emotional",
            Self::Pitch => "pitch",
        }
    }

    /// Greeting shown when a session starts in this stage.
    pub fn opening_message(&self) -> &'static str {
        match self {
            Self::Intent => {
                "Hi there! Thanks for taking the time to chat. What brings you here today?"
            }
            Self::Logical => "Let's pick up where we left off. How are you handling this right now?",
            Self::Emotional => "Let's pick up where we left off. What would it mean to you to get this solved?",
            Self::Pitch => "Let's pick up where we left off. I'd like to walk you through how we can help.",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intent" => Ok(Self::Intent),
            "logical" => Ok(Self::Logical),
            "emotional" => Ok(Self::Emotional),
            "pitch" => Ok(Self::Pitch),
            other => Err(ValidationError::invalid_format(
                "stage",
                format!("unknown stage '{}'", other),
            )),
        }
    }
}

impl StateMachine for Stage {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.next() == Some(*target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        self.next().into_iter().collect()
    }
}
