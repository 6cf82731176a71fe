//! PrismEngine — owns all components and the shared tables.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;
use prism_core::config::PrismConfig;
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{
    default_evaluators, ConsumerWeightProfile, Evaluator, FeedbackRecord, ScoredEntity,
};
use prism_core::traits::{IRecencyModel, IWeightLearner};
use prism_decay::{RecencySampleLog, TemporalDecayModel};
use prism_history::ScoreHistory;
use prism_leaderboard::{Leaderboard, SnapshotRing};
use prism_learning::FeedbackLearner;
use prism_normalizer::WeightNormalizer;
use prism_scoring::ScoreEngine;
use tracing::info;

/// The engine context.
///
/// Tables are `DashMap`s, so writers to different keys proceed in parallel and
/// writers to one key are serialized. The feedback log is append-only behind an
/// `RwLock`; the decay sample log and the snapshot ring have their own locks.
/// When a path holds two table locks at once it takes them in the order
/// evaluators → consumers and entities → history.
pub struct PrismEngine {
    pub(crate) config: PrismConfig,
    pub(crate) scorer: ScoreEngine,
    pub(crate) recency: Box<dyn IRecencyModel>,
    pub(crate) decay: TemporalDecayModel,
    pub(crate) learner: Box<dyn IWeightLearner>,
    pub(crate) normalizer: WeightNormalizer,
    pub(crate) leaderboard: Leaderboard,
    pub(crate) evaluators: DashMap<String, Evaluator>,
    pub(crate) consumers: DashMap<String, ConsumerWeightProfile>,
    pub(crate) entities: DashMap<String, ScoredEntity>,
    pub(crate) history: ScoreHistory,
    pub(crate) feedback_log: RwLock<Vec<FeedbackRecord>>,
    pub(crate) samples: Mutex<RecencySampleLog>,
    pub(crate) snapshots: RwLock<SnapshotRing>,
    pub(crate) epoch: AtomicU64,
}

impl PrismEngine {
    /// An engine without evaluators. Fails on an invalid config.
    pub fn new(config: PrismConfig) -> PrismResult<Self> {
        config.validate()?;
        let decay = TemporalDecayModel::with_config(config.decay.clone());
        Ok(Self {
            scorer: ScoreEngine::with_config(config.scoring.clone()),
            recency: Box::new(decay.clone()),
            decay,
            learner: Box::new(FeedbackLearner::with_config(config.learning.clone())),
            normalizer: WeightNormalizer::with_config(config.normalizer.clone()),
            leaderboard: Leaderboard::with_config(config.leaderboard.clone()),
            evaluators: DashMap::new(),
            consumers: DashMap::new(),
            entities: DashMap::new(),
            history: ScoreHistory::with_config(config.history.clone()),
            feedback_log: RwLock::new(Vec::new()),
            samples: Mutex::new(RecencySampleLog::with_capacity(
                config.decay.max_samples_per_evaluator,
            )),
            snapshots: RwLock::new(SnapshotRing::new(config.leaderboard.snapshot_retention)),
            epoch: AtomicU64::new(0),
            config,
        })
    }

    /// An engine with the five default evaluators.
    pub fn with_default_evaluators(config: PrismConfig) -> PrismResult<Self> {
        let engine = Self::new(config)?;
        for evaluator in default_evaluators() {
            engine.register_evaluator(evaluator)?;
        }
        info!(evaluators = engine.evaluators.len(), "engine initialized");
        Ok(engine)
    }

    /// Parse a TOML config and start with the default evaluators.
    pub fn from_toml(toml_str: &str) -> PrismResult<Self> {
        Self::with_default_evaluators(PrismConfig::from_toml(toml_str)?)
    }

    /// Swap the weight learner.
    pub fn with_learner(mut self, learner: Box<dyn IWeightLearner>) -> Self {
        self.learner = learner;
        self
    }

    /// Swap the recency model used at ingestion.
    pub fn with_recency_model(mut self, model: Box<dyn IRecencyModel>) -> Self {
        self.recency = model;
        self
    }

    pub fn config(&self) -> &PrismConfig {
        &self.config
    }

    /// Add an evaluator. Ids are unique; evaluators are never removed.
    pub fn register_evaluator(&self, evaluator: Evaluator) -> PrismResult<()> {
        if evaluator.id.is_empty() {
            return Err(PrismError::validation("evaluator id must not be empty"));
        }
        evaluator.validate()?;
        match self.evaluators.entry(evaluator.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(PrismError::validation(format!(
                "evaluator {} already registered",
                evaluator.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(evaluator);
                Ok(())
            }
        }
    }

    /// Number of completed recalibration passes.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    // ── Internal helpers ────────────────────────────────────────────────

    pub(crate) fn evaluator_snapshot(&self, evaluator_id: &str) -> PrismResult<Evaluator> {
        self.evaluators
            .get(evaluator_id)
            .map(|e| e.clone())
            .ok_or_else(|| PrismError::EvaluatorNotFound {
                id: evaluator_id.to_string(),
            })
    }

    /// Evaluators keyed by id, cloned out of the table.
    pub(crate) fn evaluator_table(&self) -> BTreeMap<String, Evaluator> {
        self.evaluators
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Evaluator id → canonical weight.
    pub(crate) fn global_weights(&self) -> BTreeMap<String, f64> {
        self.evaluators
            .iter()
            .map(|e| (e.key().clone(), e.value().current_weight))
            .collect()
    }

    pub(crate) fn read_log(&self) -> PrismResult<RwLockReadGuard<'_, Vec<FeedbackRecord>>> {
        self.feedback_log
            .read()
            .map_err(|e| PrismError::ConcurrencyError(format!("feedback log lock poisoned: {e}")))
    }

    pub(crate) fn write_log(&self) -> PrismResult<RwLockWriteGuard<'_, Vec<FeedbackRecord>>> {
        self.feedback_log
            .write()
            .map_err(|e| PrismError::ConcurrencyError(format!("feedback log lock poisoned: {e}")))
    }

    pub(crate) fn lock_samples(&self) -> PrismResult<MutexGuard<'_, RecencySampleLog>> {
        self.samples
            .lock()
            .map_err(|e| PrismError::ConcurrencyError(format!("sample log lock poisoned: {e}")))
    }

    pub(crate) fn read_snapshots(&self) -> PrismResult<RwLockReadGuard<'_, SnapshotRing>> {
        self.snapshots
            .read()
            .map_err(|e| PrismError::ConcurrencyError(format!("snapshot lock poisoned: {e}")))
    }

    pub(crate) fn write_snapshots(&self) -> PrismResult<RwLockWriteGuard<'_, SnapshotRing>> {
        self.snapshots
            .write()
            .map_err(|e| PrismError::ConcurrencyError(format!("snapshot lock poisoned: {e}")))
    }
}
