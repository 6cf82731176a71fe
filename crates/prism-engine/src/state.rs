//! Export and import of the full engine state.

use std::collections::BTreeSet;

use chrono::Utc;
use prism_core::constants::{MAX_SCORE, MIN_SCORE, STATE_FORMAT_VERSION};
use prism_core::errors::{PrismError, PrismResult, WeightError};
use prism_core::models::EngineState;
use prism_core::traits::IStateStore;
use tracing::info;

use crate::engine::PrismEngine;

impl PrismEngine {
    /// Point-in-time copy of all six collections.
    pub fn export_weights(&self) -> PrismResult<EngineState> {
        let evaluators = self.evaluators();
        let mut consumer_weight_profiles: Vec<_> =
            self.consumers.iter().map(|c| c.value().clone()).collect();
        consumer_weight_profiles.sort_by(|a, b| a.consumer_id.cmp(&b.consumer_id));
        let mut scored_entities: Vec<_> = self.entities.iter().map(|e| e.value().clone()).collect();
        scored_entities.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(EngineState {
            version: STATE_FORMAT_VERSION,
            exported_at: Utc::now(),
            evaluators,
            consumer_weight_profiles,
            scored_entities,
            feedback_log: self.read_log()?.clone(),
            leaderboard_snapshots: self.snapshots()?,
            score_history: self.history.export(),
        })
    }

    /// Replace all state. Every weight and score is validated first; on
    /// failure nothing is replaced.
    pub fn import_weights(&self, state: EngineState) -> PrismResult<()> {
        validate_state(&state)?;

        let counts = (
            state.evaluators.len(),
            state.scored_entities.len(),
            state.feedback_log.len(),
        );

        self.evaluators.clear();
        for evaluator in state.evaluators {
            self.evaluators.insert(evaluator.id.clone(), evaluator);
        }
        self.consumers.clear();
        for profile in state.consumer_weight_profiles {
            self.consumers.insert(profile.consumer_id.clone(), profile);
        }
        self.entities.clear();
        for entity in state.scored_entities {
            self.entities.insert(entity.id.clone(), entity);
        }
        *self.write_log()? = state.feedback_log;
        self.write_snapshots()?.replace(state.leaderboard_snapshots);
        self.history.replace_all(state.score_history)?;

        info!(
            evaluators = counts.0,
            entities = counts.1,
            feedback = counts.2,
            "state imported"
        );
        Ok(())
    }

    pub fn export_json(&self) -> PrismResult<String> {
        Ok(serde_json::to_string_pretty(&self.export_weights()?)?)
    }

    pub fn import_json(&self, json: &str) -> PrismResult<()> {
        let state: EngineState = serde_json::from_str(json)?;
        self.import_weights(state)
    }

    pub fn persist(&self, store: &dyn IStateStore) -> PrismResult<()> {
        store.save(&self.export_weights()?)
    }

    /// Load from the store. `false` when it holds nothing yet.
    pub fn restore(&self, store: &dyn IStateStore) -> PrismResult<bool> {
        match store.load()? {
            Some(state) => {
                self.import_weights(state)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn check_score(what: &str, value: f64) -> PrismResult<()> {
    if !value.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(PrismError::validation(format!(
            "{what} {value} outside [{MIN_SCORE}, {MAX_SCORE}]"
        )));
    }
    Ok(())
}

fn validate_state(state: &EngineState) -> PrismResult<()> {
    if state.version == 0 || state.version > STATE_FORMAT_VERSION {
        return Err(PrismError::validation(format!(
            "unsupported state format version {}",
            state.version
        )));
    }

    let mut evaluator_ids = BTreeSet::new();
    for evaluator in &state.evaluators {
        if evaluator.id.is_empty() || !evaluator_ids.insert(evaluator.id.as_str()) {
            return Err(PrismError::validation(format!(
                "evaluator id {:?} is empty or duplicated",
                evaluator.id
            )));
        }
        evaluator.validate()?;
    }
    let known = |id: &str| -> PrismResult<()> {
        if evaluator_ids.contains(id) {
            Ok(())
        } else {
            Err(PrismError::EvaluatorNotFound { id: id.to_string() })
        }
    };

    for profile in &state.consumer_weight_profiles {
        for (evaluator_id, copy) in &profile.weights {
            known(evaluator_id)?;
            WeightError::check_non_negative(evaluator_id, copy.weight)?;
            copy.factors.validate()?;
        }
    }

    for entity in &state.scored_entities {
        check_score("entity composite", entity.composite_score)?;
        for (evaluator_id, score) in &entity.evaluator_scores {
            known(evaluator_id)?;
            check_score("raw score", score.raw_score)?;
            check_score("adjusted score", score.adjusted_score)?;
            if let Some(visibility) = &score.visibility {
                visibility.validate()?;
            }
        }
    }

    for record in &state.feedback_log {
        known(&record.evaluator_id)?;
        record.validate()?;
    }

    for snapshot in &state.leaderboard_snapshots {
        for entry in &snapshot.entries {
            check_score("leaderboard composite", entry.composite_score)?;
        }
    }

    for point in &state.score_history {
        if point.entity_id.is_empty() {
            return Err(PrismError::validation("history point without entity id"));
        }
        check_score("history composite", point.composite_score)?;
        if point.sub_scores.values().any(|s| !s.is_finite()) {
            return Err(PrismError::validation(format!(
                "history point for {} has a non-finite sub-score",
                point.entity_id
            )));
        }
    }
    Ok(())
}
