//! Test fixtures for the Prism workspace: golden scenario files, model
//! builders, and an in-memory state store.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{
    default_evaluators, AppliedChange, Category, EngineState, Evaluator, EvaluatorScore,
    FeedbackRecord, RawMeasurement, ScoredEntity, VisibilitySignals,
};
use prism_core::traits::IStateStore;
use serde::de::DeserializeOwned;
use serde::Deserialize;

// ── Golden files ────────────────────────────────────────────────────────

/// Directory holding the golden JSON files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// An entity as written in `leaderboard_entities.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureEntity {
    pub id: String,
    pub scores: Vec<(String, f64)>,
}

impl FixtureEntity {
    pub fn into_entity(self, measured_at: DateTime<Utc>) -> ScoredEntity {
        let scores: Vec<(&str, f64)> = self.scores.iter().map(|(e, s)| (e.as_str(), *s)).collect();
        scored_entity(&self.id, &scores, measured_at)
    }
}

/// The golden leaderboard entities, all measured at `measured_at`.
pub fn leaderboard_entities(measured_at: DateTime<Utc>) -> Vec<ScoredEntity> {
    load_fixture::<Vec<FixtureEntity>>("leaderboard_entities.json")
        .into_iter()
        .map(|f| f.into_entity(measured_at))
        .collect()
}

// ── Builders ────────────────────────────────────────────────────────────

/// Fixed reference instant so date arithmetic in tests is reproducible.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    reference_now() - Duration::days(days)
}

/// One of the default evaluators.
///
/// # Panics
/// Panics for ids outside the default set.
pub fn evaluator(id: &str) -> Evaluator {
    default_evaluators()
        .into_iter()
        .find(|e| e.id == id)
        .unwrap_or_else(|| panic!("no default evaluator {id}"))
}

/// The default evaluators keyed by id.
pub fn evaluator_map() -> BTreeMap<String, Evaluator> {
    default_evaluators()
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect()
}

pub fn visibility(citations: u32, included: bool, confidence: f64, response_ms: Option<f64>) -> VisibilitySignals {
    VisibilitySignals {
        citation_count: citations,
        included,
        confidence,
        response_time_ms: response_ms,
    }
}

/// A measurement with every category at `score`.
pub fn uniform_measurement(score: f64) -> RawMeasurement {
    Category::ALL
        .iter()
        .fold(RawMeasurement::new(), |m, c| m.with_category(*c, score))
}

/// An evaluator score whose raw and adjusted values are both `adjusted`.
pub fn evaluator_score(
    evaluator_id: &str,
    adjusted: f64,
    visibility: Option<VisibilitySignals>,
    measured_at: DateTime<Utc>,
) -> EvaluatorScore {
    EvaluatorScore {
        evaluator_id: evaluator_id.to_string(),
        raw_score: adjusted,
        adjusted_score: adjusted,
        category_breakdown: BTreeMap::new(),
        factor_breakdown: BTreeMap::new(),
        visibility,
        content_age_days: 0.0,
        measured_at,
    }
}

/// An entity carrying the given evaluator scores, all measured at `measured_at`.
pub fn scored_entity(id: &str, scores: &[(&str, f64)], measured_at: DateTime<Utc>) -> ScoredEntity {
    let mut entity = ScoredEntity::new(id, measured_at);
    for (evaluator_id, adjusted) in scores {
        entity.upsert_score(evaluator_score(evaluator_id, *adjusted, None, measured_at));
    }
    entity
}

/// `n` records for `evaluator_id`, each applying `change_type` with `impact`.
pub fn feedback_records(evaluator_id: &str, change_type: &str, impact: f64, n: usize) -> Vec<FeedbackRecord> {
    (0..n)
        .map(|i| {
            FeedbackRecord::new(
                evaluator_id,
                format!("https://fixture.example/{i}"),
                40.0,
                40.0 + 10.0 * impact,
                vec![AppliedChange::new(change_type, impact, true)],
            )
        })
        .collect()
}

// ── State store ─────────────────────────────────────────────────────────

/// `IStateStore` keeping the last saved state in memory.
#[derive(Default)]
pub struct InMemoryStateStore {
    state: Mutex<Option<EngineState>>,
    saves: Mutex<usize>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl IStateStore for InMemoryStateStore {
    fn save(&self, state: &EngineState) -> PrismResult<()> {
        let mut slot = self
            .state
            .lock()
            .map_err(|e| PrismError::ConcurrencyError(e.to_string()))?;
        *slot = Some(state.clone());
        let mut saves = self
            .saves
            .lock()
            .map_err(|e| PrismError::ConcurrencyError(e.to_string()))?;
        *saves += 1;
        Ok(())
    }

    fn load(&self) -> PrismResult<Option<EngineState>> {
        let slot = self
            .state
            .lock()
            .map_err(|e| PrismError::ConcurrencyError(e.to_string()))?;
        Ok(slot.clone())
    }
}
