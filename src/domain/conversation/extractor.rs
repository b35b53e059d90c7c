//! Rule-based field extraction from user messages.
//!
//! Matches fixed keyword tables against the latest user message and
//! fills the fields owned by the active stage. Keyword tables are data:
//! they are kept exactly as tuned, not replaced by fuzzier matching.

use tracing::debug;

use super::extracted::ExtractedFields;
use super::stage::Stage;

/// Default prefix length for stored scalar fields, in characters.
pub const DEFAULT_MAX_FIELD_CHARS: usize = 100;

/// Keyword tables and limits for the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Intent stage: fills `desired_outcome`.
    pub desired_outcome_keywords: Vec<String>,
    /// Logical stage: fills `current_strategy`.
    pub current_strategy_keywords: Vec<String>,
    /// Logical stage: fills `problem`.
    pub problem_keywords: Vec<String>,
    /// Emotional stage: appends to `goals`.
    pub goal_keywords: Vec<String>,
    /// Emotional stage: appends to `consequences`.
    pub consequence_keywords: Vec<String>,
    /// Scalar fields keep at most this many characters.
    pub max_field_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            desired_outcome_keywords: strings(&["need", "want", "looking for", "help with"]),
            current_strategy_keywords: strings(&["doing", "trying", "using", "currently"]),
            problem_keywords: strings(&["problem", "issue", "not working", "struggling"]),
            goal_keywords: strings(&["would", "could", "want to", "hope"]),
            consequence_keywords: strings(&["if not", "without", "won't", "can't", "fail"]),
            max_field_chars: DEFAULT_MAX_FIELD_CHARS,
        }
    }
}

impl ExtractorConfig {
    /// Overrides the scalar prefix length.
    pub fn with_max_field_chars(mut self, max: usize) -> Self {
        self.max_field_chars = max;
        self
    }
}

/// A field the extractor may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractedField {
    DesiredOutcome,
    CurrentStrategy,
    Problem,
    Goal,
    Consequence,
}

/// Fields written by a single `extract` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub updated: Vec<ExtractedField>,
}

impl ExtractionOutcome {
    /// Returns true if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty()
    }

    /// Returns true if `field` was written.
    pub fn contains(&self, field: ExtractedField) -> bool {
        self.updated.contains(&field)
    }
}

/// Keyword matcher that populates `ExtractedFields`.
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    config: ExtractorConfig,
}

impl FieldExtractor {
    /// Creates an extractor with the given tables.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Inspects `message` for the active `stage` and updates `extracted`.
    ///
    /// A message may fill several fields of the same stage at once.
    /// The `Pitch` stage never extracts.
    pub fn extract(
        &self,
        stage: Stage,
        message: &str,
        extracted: &mut ExtractedFields,
    ) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::default();
        let text = message.trim();
        if text.is_empty() {
            return outcome;
        }
        let lower = text.to_lowercase();

        match stage {
            Stage::Intent => {
                if extracted.desired_outcome.is_none()
                    && contains_any(&lower, &self.config.desired_outcome_keywords)
                    && extracted.set_desired_outcome(self.prefix(text))
                {
                    outcome.updated.push(ExtractedField::DesiredOutcome);
                }
            }
            Stage::Logical => {
                if extracted.current_strategy.is_none()
                    && contains_any(&lower, &self.config.current_strategy_keywords)
                    && extracted.set_current_strategy(self.prefix(text))
                {
                    outcome.updated.push(ExtractedField::CurrentStrategy);
                }
                if extracted.problem.is_none()
                    && contains_any(&lower, &self.config.problem_keywords)
                    && extracted.set_problem(self.prefix(text))
                {
                    outcome.updated.push(ExtractedField::Problem);
                }
            }
            Stage::Emotional => {
                if contains_any(&lower, &self.config.goal_keywords) && extracted.add_goal(text) {
                    outcome.updated.push(ExtractedField::Goal);
                }
                if contains_any(&lower, &self.config.consequence_keywords)
                    && extracted.add_consequence(text)
                {
                    outcome.updated.push(ExtractedField::Consequence);
                }
            }
            Stage::Pitch => {}
        }

        if !outcome.is_empty() {
            debug!(stage = %stage, fields = ?outcome.updated, "extracted fields from user message");
        }
        outcome
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn prefix(&self, text: &str) -> String {
        text.chars().take(self.config.max_field_chars).collect()
    }
}

/// Case-insensitive substring search. `lower` must already be lowercased.
fn contains_any(lower: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
