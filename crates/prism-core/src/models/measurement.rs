use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationStatus;
use crate::errors::{PrismError, PrismResult};

/// Score categories combined by the composite scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Technical,
    Content,
    EvaluatorSpecific,
    ExternalReference,
    Freshness,
    Trust,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Technical,
        Category::Content,
        Category::EvaluatorSpecific,
        Category::ExternalReference,
        Category::Freshness,
        Category::Trust,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Content => "content",
            Category::EvaluatorSpecific => "evaluator_specific",
            Category::ExternalReference => "external_reference",
            Category::Freshness => "freshness",
            Category::Trust => "trust",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility signals an evaluator reported for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySignals {
    pub citation_count: u32,
    pub included: bool,
    /// Evaluator confidence in [0.0, 1.0].
    pub confidence: f64,
    /// Missing response times are left out of the leaderboard score.
    #[serde(default)]
    pub response_time_ms: Option<f64>,
}

impl VisibilitySignals {
    pub fn validate(&self) -> PrismResult<()> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(PrismError::validation(format!(
                "visibility confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        if let Some(ms) = self.response_time_ms {
            if !ms.is_finite() || ms < 0.0 {
                return Err(PrismError::validation(format!(
                    "response time {ms} must be finite and non-negative"
                )));
            }
        }
        Ok(())
    }
}

/// An already-extracted measurement pushed in by the surrounding application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurement {
    #[serde(default)]
    pub category_scores: BTreeMap<Category, f64>,
    #[serde(default)]
    pub factor_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub visibility: Option<VisibilitySignals>,
    /// Missing age is treated as fresh content (0 days).
    #[serde(default)]
    pub content_age_days: Option<f64>,
    /// Missing timestamp means "now" at ingestion time.
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub validation: ValidationStatus,
}

impl RawMeasurement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category, score: f64) -> Self {
        self.category_scores.insert(category, score);
        self
    }

    pub fn with_factor(mut self, factor: impl Into<String>, score: f64) -> Self {
        self.factor_scores.insert(factor.into(), score);
        self
    }

    pub fn with_visibility(mut self, visibility: VisibilitySignals) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_content_age(mut self, days: f64) -> Self {
        self.content_age_days = Some(days);
        self
    }

    pub fn measured_at(mut self, at: DateTime<Utc>) -> Self {
        self.measured_at = Some(at);
        self
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self
    }

    pub fn with_validation(mut self, status: ValidationStatus) -> Self {
        self.validation = status;
        self
    }

    /// No category and no factor scores.
    pub fn is_empty(&self) -> bool {
        self.category_scores.is_empty() && self.factor_scores.is_empty()
    }

    /// Content age with the documented default applied. Negative ages
    /// (clock skew) count as fresh.
    pub fn content_age_or_default(&self) -> f64 {
        self.content_age_days.unwrap_or(0.0).max(0.0)
    }
}
