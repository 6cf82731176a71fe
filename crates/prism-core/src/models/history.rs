use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation state of a recorded measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Validated,
    #[default]
    Unvalidated,
    Failed,
}

/// One point in an entity's score history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistoryPoint {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub composite_score: f64,
    /// Evaluator id → adjusted score at this point.
    pub sub_scores: BTreeMap<String, f64>,
    pub validation: ValidationStatus,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Direction of an entity's score over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// Trend classification plus the history supporting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub entity_id: String,
    pub window_days: i64,
    pub direction: TrendDirection,
    pub percent_change: f64,
    pub start_score: Option<f64>,
    pub end_score: Option<f64>,
    /// False when fewer than two points fall inside the window.
    pub sufficient_data: bool,
    pub points: Vec<ScoreHistoryPoint>,
}

/// An entity with a notable change over the summary window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub entity_id: String,
    pub start_score: f64,
    pub end_score: f64,
    pub percent_change: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFrequency {
    pub issue: String,
    pub count: usize,
}

/// Statistics across all tracked entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub tracked_entities: usize,
    pub total_points: usize,
    /// Mean of each entity's latest composite.
    pub average_score: f64,
    /// Evaluator id → mean latest sub-score.
    pub average_sub_scores: BTreeMap<String, f64>,
    /// Validated points / all points.
    pub validation_rate: f64,
    pub top_improving: Vec<Mover>,
    pub top_declining: Vec<Mover>,
    pub common_issues: Vec<IssueFrequency>,
}
