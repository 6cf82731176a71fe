use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arg-max and threshold predicates over an entity's evaluator scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHighlights {
    pub top_evaluator: Option<String>,
    pub best_group: Option<String>,
    pub citation_leader: bool,
    pub inclusion_leader: bool,
    pub high_performer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based, dense, unique.
    pub rank: usize,
    pub entity_id: String,
    pub composite_score: f64,
    /// Evaluator id → weighted leaderboard score.
    pub evaluator_scores: BTreeMap<String, f64>,
    pub total_citations: u32,
    /// Share of reporting evaluators that included the entity.
    pub inclusion_rate: f64,
    pub highlights: EntityHighlights,
    /// Positive when the entity climbed since the previous snapshot.
    pub rank_change: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHighlights {
    pub top_entity: Option<String>,
    pub citation_leader: Option<String>,
    pub inclusion_leader: Option<String>,
    pub biggest_climber: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorCoverage {
    pub evaluator_id: String,
    pub entities: usize,
    pub mean_score: f64,
}

/// Aggregate statistics of one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_entities: usize,
    pub ranked_entities: usize,
    /// Scored, but below the minimum score.
    pub excluded_entities: usize,
    pub failed_entities: usize,
    pub mean_score: f64,
    pub median_score: f64,
    pub top_score: f64,
    pub evaluator_coverage: Vec<EvaluatorCoverage>,
}

/// One immutable, ranked, timestamped view of all tracked entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<LeaderboardEntry>,
    pub highlights: SnapshotHighlights,
    /// blake3 over the ranking; equal inputs give equal fingerprints.
    pub fingerprint: String,
    pub metrics: PerformanceMetrics,
}

impl LeaderboardSnapshot {
    /// Entity id → rank for every entry, for repeated lookups.
    pub fn rank_index(&self) -> HashMap<&str, usize> {
        self.entries
            .iter()
            .map(|e| (e.entity_id.as_str(), e.rank))
            .collect()
    }

    pub fn rank_of(&self, entity_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.entity_id == entity_id)
            .map(|e| e.rank)
    }
}
