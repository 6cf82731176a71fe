use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, VisibilitySignals};
use crate::constants::clamp_score;

/// The latest score one evaluator produced for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorScore {
    pub evaluator_id: String,
    /// Composite before temporal decay.
    pub raw_score: f64,
    /// Composite after temporal decay.
    pub adjusted_score: f64,
    pub category_breakdown: BTreeMap<Category, f64>,
    pub factor_breakdown: BTreeMap<String, f64>,
    #[serde(default)]
    pub visibility: Option<VisibilitySignals>,
    pub content_age_days: f64,
    pub measured_at: DateTime<Utc>,
}

/// Composite change over fixed horizons. `None` when no history reaches back that far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDeltas {
    pub daily: Option<f64>,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
}

/// A content entity (usually a URL) scored across evaluators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub id: String,
    pub evaluator_scores: BTreeMap<String, EvaluatorScore>,
    /// Mean adjusted score across evaluators, always in [0, 100].
    pub composite_score: f64,
    /// Rank in the most recent leaderboard, if the entity was ranked.
    pub rank: Option<usize>,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub deltas: ScoreDeltas,
}

impl ScoredEntity {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            evaluator_scores: BTreeMap::new(),
            composite_score: 0.0,
            rank: None,
            first_seen: now,
            last_updated: now,
            deltas: ScoreDeltas::default(),
        }
    }

    /// Store one evaluator's score unless a later measurement from the same
    /// evaluator is already held. Returns whether the score was stored.
    pub fn upsert_score(&mut self, score: EvaluatorScore) -> bool {
        if score.measured_at < self.first_seen {
            self.first_seen = score.measured_at;
        }
        let stale = self
            .evaluator_scores
            .get(&score.evaluator_id)
            .is_some_and(|existing| existing.measured_at > score.measured_at);
        if stale {
            return false;
        }
        if score.measured_at > self.last_updated {
            self.last_updated = score.measured_at;
        }
        self.evaluator_scores
            .insert(score.evaluator_id.clone(), score);
        self.recompute_composite();
        true
    }

    /// The composite as it would be with `score` in place of the stored
    /// score for its evaluator. Leaves the entity untouched.
    pub fn composite_with(&self, score: &EvaluatorScore) -> f64 {
        let scores: Vec<f64> = self
            .evaluator_scores
            .iter()
            .filter(|(id, _)| **id != score.evaluator_id)
            .map(|(_, s)| s.adjusted_score)
            .chain(std::iter::once(score.adjusted_score))
            .filter(|s| s.is_finite())
            .collect();
        mean_score(&scores)
    }

    /// Sub-scores as they would be with `score` in place.
    pub fn sub_scores_with(&self, score: &EvaluatorScore) -> BTreeMap<String, f64> {
        let mut sub_scores = self.sub_scores();
        sub_scores.insert(score.evaluator_id.clone(), score.adjusted_score);
        sub_scores
    }

    /// Mean of the adjusted evaluator scores, so the scale does not depend on
    /// how many evaluators reported.
    pub fn recompute_composite(&mut self) -> f64 {
        let scores: Vec<f64> = self
            .evaluator_scores
            .values()
            .map(|s| s.adjusted_score)
            .filter(|s| s.is_finite())
            .collect();
        self.composite_score = mean_score(&scores);
        self.composite_score
    }

    /// Evaluator id → adjusted score.
    pub fn sub_scores(&self) -> BTreeMap<String, f64> {
        self.evaluator_scores
            .iter()
            .map(|(id, s)| (id.clone(), s.adjusted_score))
            .collect()
    }
}

fn mean_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        clamp_score(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}
