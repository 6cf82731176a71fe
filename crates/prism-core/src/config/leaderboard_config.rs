use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::WeightError;

/// Weights of the per-evaluator leaderboard components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub citation: f64,
    pub inclusion: f64,
    pub confidence: f64,
    pub response_time: f64,
    /// Weight of the stored, decay-adjusted score engine output.
    pub quality: f64,
}

impl ComponentWeights {
    pub fn validate(&self) -> Result<(), WeightError> {
        WeightError::check_non_negative("citation", self.citation)?;
        WeightError::check_non_negative("inclusion", self.inclusion)?;
        WeightError::check_non_negative("confidence", self.confidence)?;
        WeightError::check_non_negative("response_time", self.response_time)?;
        WeightError::check_non_negative("quality", self.quality)?;
        let total =
            self.citation + self.inclusion + self.confidence + self.response_time + self.quality;
        if total <= 0.0 {
            return Err(WeightError::Empty {
                name: "component_weights".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            citation: defaults::DEFAULT_COMPONENT_CITATION,
            inclusion: defaults::DEFAULT_COMPONENT_INCLUSION,
            confidence: defaults::DEFAULT_COMPONENT_CONFIDENCE,
            response_time: defaults::DEFAULT_COMPONENT_RESPONSE_TIME,
            quality: defaults::DEFAULT_COMPONENT_QUALITY,
        }
    }
}

/// Leaderboard aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Entities scoring below this are left out of the ranking.
    pub min_score: f64,
    /// Snapshots retained in history.
    pub snapshot_retention: usize,
    /// Entities without a measurement for this many days are pruned.
    pub entity_retention_days: i64,
    /// Citation count that earns the full citation score.
    pub citation_cap: u32,
    /// Response time (ms) at which the response score reaches zero.
    pub max_response_ms: f64,
    /// Composite at or above which an entity is flagged as a high performer.
    pub high_performer_threshold: f64,
    /// Entities per chunk in chunked rebuilds.
    pub chunk_size: usize,
    pub component_weights: ComponentWeights,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            min_score: defaults::DEFAULT_MIN_SCORE,
            snapshot_retention: defaults::DEFAULT_SNAPSHOT_RETENTION,
            entity_retention_days: defaults::DEFAULT_ENTITY_RETENTION_DAYS,
            citation_cap: defaults::DEFAULT_CITATION_CAP,
            max_response_ms: defaults::DEFAULT_MAX_RESPONSE_MS,
            high_performer_threshold: defaults::DEFAULT_HIGH_PERFORMER_THRESHOLD,
            chunk_size: defaults::DEFAULT_REBUILD_CHUNK_SIZE,
            component_weights: ComponentWeights::default(),
        }
    }
}
