use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SCORE, MIN_SCORE};
use crate::errors::{PrismError, PrismResult};

/// Confidence assumed when a record does not carry one.
pub const DEFAULT_FEEDBACK_CONFIDENCE: f64 = 0.5;

/// One remediation change attributed to a before/after observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedChange {
    pub change_type: String,
    /// Observed impact in [-1.0, 1.0].
    pub impact: f64,
    pub applied: bool,
}

impl AppliedChange {
    pub fn new(change_type: impl Into<String>, impact: f64, applied: bool) -> Self {
        Self {
            change_type: change_type.into(),
            impact,
            applied,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackOutcome {
    Positive,
    Negative,
    Neutral,
}

impl FeedbackOutcome {
    /// Classify a before/after pair.
    pub fn from_scores(before: f64, after: f64) -> Self {
        if after > before {
            FeedbackOutcome::Positive
        } else if after < before {
            FeedbackOutcome::Negative
        } else {
            FeedbackOutcome::Neutral
        }
    }
}

/// An observed score change attributed to specific changes. Immutable once
/// recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub evaluator_id: String,
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub before_score: f64,
    pub after_score: f64,
    pub changes: Vec<AppliedChange>,
    pub outcome: FeedbackOutcome,
    pub confidence: f64,
}

impl FeedbackRecord {
    /// New record timestamped now, outcome derived from the scores.
    pub fn new(
        evaluator_id: impl Into<String>,
        entity_id: impl Into<String>,
        before_score: f64,
        after_score: f64,
        changes: Vec<AppliedChange>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            evaluator_id: evaluator_id.into(),
            entity_id: entity_id.into(),
            timestamp: Utc::now(),
            before_score,
            after_score,
            changes,
            outcome: FeedbackOutcome::from_scores(before_score, after_score),
            confidence: DEFAULT_FEEDBACK_CONFIDENCE,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn score_delta(&self) -> f64 {
        self.after_score - self.before_score
    }

    pub fn validate(&self) -> PrismResult<()> {
        if self.evaluator_id.is_empty() || self.entity_id.is_empty() {
            return Err(PrismError::validation(
                "feedback record needs an evaluator id and an entity id",
            ));
        }
        for (name, score) in [("before_score", self.before_score), ("after_score", self.after_score)] {
            if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                return Err(PrismError::validation(format!(
                    "{name} {score} outside [{MIN_SCORE}, {MAX_SCORE}]"
                )));
            }
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(PrismError::validation(format!(
                "feedback confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        for change in &self.changes {
            if !change.impact.is_finite() || !(-1.0..=1.0).contains(&change.impact) {
                return Err(PrismError::validation(format!(
                    "impact {} of change {} outside [-1, 1]",
                    change.impact, change.change_type
                )));
            }
        }
        Ok(())
    }
}
