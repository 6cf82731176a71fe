use std::collections::BTreeMap;

use prism_core::config::PrismConfig;
use prism_core::constants::DEFAULT_FACTORS;
use prism_core::models::{Evaluator, FactorWeights, FeedbackRecord, LearningOutcome};
use prism_core::traits::IWeightLearner;
use prism_core::{PrismError, PrismResult};
use prism_engine::PrismEngine;
use test_fixtures::{feedback_records, uniform_measurement};

fn engine_with(auto_recalibrate: bool) -> PrismEngine {
    let mut config = PrismConfig::default();
    config.learning.auto_recalibrate = auto_recalibrate;
    PrismEngine::with_default_evaluators(config).unwrap()
}

// ── Feedback and learning ───────────────────────────────────────────────

#[test]
fn feedback_below_minimum_does_not_learn() {
    let engine = engine_with(true);
    for record in feedback_records("claude", "schema", 0.25, 3) {
        let ack = engine.record_feedback(record).unwrap();
        assert!(ack.learning.is_none());
    }
    assert_eq!(engine.feedback_count().unwrap(), 3);
    let claude = engine.evaluator("claude").unwrap();
    assert_eq!(claude.factor_weights, claude.base_factor_weights);
}

#[test]
fn enough_feedback_learns_automatically() {
    let engine = engine_with(true);
    engine.register_consumer("dashboard").unwrap();
    let mut last = None;
    for record in feedback_records("claude", "schema", 0.25, 6) {
        last = Some(engine.record_feedback(record).unwrap());
    }
    let ack = last.unwrap();
    assert_eq!(ack.sequence, 5);
    assert_eq!(ack.evaluator_records, 6);
    assert!(ack.learning.as_ref().unwrap().changed());

    let claude = engine.evaluator("claude").unwrap();
    assert!((claude.factor_weights.get("schema").unwrap() - 0.275).abs() < 1e-9);
    assert!((claude.factor_weights.total() - 1.0).abs() < 1e-9);

    // Consumer factor copies follow the learned weights.
    let profile = engine.consumer("dashboard").unwrap();
    assert_eq!(profile.weights["claude"].factors, claude.factor_weights);
}

#[test]
fn feedback_for_unknown_evaluator_is_rejected() {
    let engine = engine_with(true);
    let record = feedback_records("bard", "schema", 0.25, 1).remove(0);
    assert!(matches!(
        engine.record_feedback(record).unwrap_err(),
        PrismError::EvaluatorNotFound { .. }
    ));
    assert_eq!(engine.feedback_count().unwrap(), 0);
}

struct FailingLearner;

impl IWeightLearner for FailingLearner {
    fn learn(&self, _evaluator: &Evaluator, _records: &[FeedbackRecord]) -> PrismResult<LearningOutcome> {
        Err(PrismError::ConfigError("learner unavailable".to_string()))
    }
}

#[test]
fn failed_automatic_learning_still_acknowledges_the_record() {
    let engine = engine_with(true).with_learner(Box::new(FailingLearner));
    for (i, record) in feedback_records("claude", "schema", 0.25, 6).into_iter().enumerate() {
        let ack = engine.record_feedback(record).unwrap();
        assert_eq!(ack.sequence, i);
        assert!(ack.learning.is_none());
    }
    assert_eq!(engine.feedback_count().unwrap(), 6);
    let claude = engine.evaluator("claude").unwrap();
    assert_eq!(claude.factor_weights, claude.base_factor_weights);
    assert_eq!(claude.learned_records, 0);

    // Recalibration reports the failure per evaluator instead of aborting.
    let report = engine.recalibrate().unwrap();
    assert!(report.outcomes.is_empty());
    assert_eq!(report.skipped.len(), 5);
}

#[test]
fn recalibrate_reports_learned_and_skipped_evaluators() {
    let engine = engine_with(false);
    for record in feedback_records("claude", "schema", 0.25, 6) {
        assert!(engine.record_feedback(record).unwrap().learning.is_none());
    }
    for record in feedback_records("gemini", "authority", 0.3, 2) {
        engine.record_feedback(record).unwrap();
    }

    let report = engine.recalibrate().unwrap();
    assert_eq!(report.epoch, 1);
    assert_eq!(report.watermark, 8);
    assert_eq!(engine.epoch(), 1);

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(skipped, vec!["gemini"]);
    let claude = report
        .outcomes
        .iter()
        .find(|o| o.evaluator_id == "claude")
        .unwrap();
    assert!((claude.new_weights.get("schema").unwrap() - 0.275).abs() < 1e-9);
    // Evaluators without feedback keep their weights.
    let chatgpt = report
        .outcomes
        .iter()
        .find(|o| o.evaluator_id == "chatgpt")
        .unwrap();
    assert!(!chatgpt.changed());
    assert!(report.sensitivity_updates.is_empty());
}

#[test]
fn recalibration_is_repeatable() {
    let engine = engine_with(false);
    for record in feedback_records("claude", "schema", 0.25, 6) {
        engine.record_feedback(record).unwrap();
    }
    engine.recalibrate().unwrap();
    let first = engine.evaluator("claude").unwrap().factor_weights;
    let report = engine.recalibrate().unwrap();
    assert_eq!(report.epoch, 2);
    assert_eq!(engine.evaluator("claude").unwrap().factor_weights, first);
}

#[test]
fn effectiveness_is_reported_per_evaluator() {
    let engine = engine_with(false);
    for record in feedback_records("claude", "schema", 0.25, 2) {
        engine.record_feedback(record).unwrap();
    }
    for record in feedback_records("claude", "authority", -0.1, 1) {
        engine.record_feedback(record).unwrap();
    }
    let effectiveness = engine.strategy_effectiveness("claude").unwrap();
    assert_eq!(effectiveness[0].change_type, "schema");
    assert_eq!(effectiveness[0].applications, 2);
    assert_eq!(effectiveness[1].change_type, "authority");
    assert!(engine.strategy_effectiveness("nobody").is_err());
}

// ── Recency sensitivity ─────────────────────────────────────────────────

fn remeasure_old_content(engine: &PrismEngine) {
    for i in 0..6 {
        let id = format!("https://old.example/{i}");
        engine
            .ingest(&id, "claude", uniform_measurement(80.0).with_content_age(180.0))
            .unwrap();
        engine
            .ingest(&id, "claude", uniform_measurement(60.0).with_content_age(180.0))
            .unwrap();
    }
}

#[test]
fn sensitivity_suggestion_is_advisory_by_default() {
    let engine = engine_with(false);
    assert_eq!(engine.suggest_recency_sensitivity("claude").unwrap(), None);
    remeasure_old_content(&engine);

    let suggestion = engine.suggest_recency_sensitivity("claude").unwrap().unwrap();
    // Implied sensitivity (8 / 68) / 0.3, moved halfway from 0.5.
    let implied = (8.0 / 68.0) / 0.3;
    assert!((suggestion - (0.5 + 0.5 * (implied - 0.5))).abs() < 1e-9);

    let report = engine.recalibrate().unwrap();
    assert!(report.sensitivity_updates.is_empty());
    assert_eq!(engine.evaluator("claude").unwrap().recency_sensitivity, 0.5);
}

#[test]
fn sensitivity_is_adopted_when_enabled() {
    let mut config = PrismConfig::default();
    config.learning.auto_recalibrate = false;
    config.learning.adjust_recency_sensitivity = true;
    let engine = PrismEngine::with_default_evaluators(config).unwrap();
    remeasure_old_content(&engine);

    let report = engine.recalibrate().unwrap();
    assert_eq!(report.sensitivity_updates.len(), 1);
    let update = &report.sensitivity_updates[0];
    assert_eq!(update.evaluator_id, "claude");
    assert_eq!(update.previous, 0.5);
    assert!(update.new < 0.5);
    assert_eq!(
        engine.evaluator("claude").unwrap().recency_sensitivity,
        update.new
    );
}

// ── Consumer weights ────────────────────────────────────────────────────

#[test]
fn normalization_half_corrects_drifted_consumer() {
    let engine = engine_with(false);
    engine.register_consumer("dashboard").unwrap();
    assert!(engine.register_consumer("dashboard").is_err());
    engine.set_consumer_weight("dashboard", "claude", 1.3).unwrap();

    let before = engine.validate_consistency();
    assert!(!before.is_consistent());

    let results = engine.normalize(Some("dashboard")).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].corrected_count(), 1);
    let weight = engine.consumer("dashboard").unwrap().weight("claude").unwrap();
    assert!((weight - 1.105).abs() < 1e-9);
    assert!(engine.validate_consistency().is_consistent());

    assert!(matches!(
        engine.normalize(Some("nobody")).unwrap_err(),
        PrismError::ConsumerNotFound { .. }
    ));
}

#[test]
fn zero_weight_evaluator_does_not_block_normalization() {
    let engine = engine_with(false);
    engine
        .register_evaluator(
            Evaluator::new("muted", "lab", FactorWeights::equal(&DEFAULT_FACTORS), 0.5)
                .with_base_weight(0.0),
        )
        .unwrap();
    engine.register_consumer("api").unwrap();
    engine.register_consumer("dashboard").unwrap();
    engine.set_consumer_weight("dashboard", "claude", 1.3).unwrap();

    let results = engine.normalize(None).unwrap();
    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(result.skipped_evaluators, vec!["muted".to_string()]);
    }
    let weight = engine.consumer("dashboard").unwrap().weight("claude").unwrap();
    assert!((weight - 1.105).abs() < 1e-9);

    let report = engine.recalibrate().unwrap();
    assert_eq!(report.normalizations.len(), 2);
    assert!(report.normalization_failures.is_empty());
}

#[test]
fn global_weight_update_reaches_consumers() {
    let engine = engine_with(false);
    engine.register_consumer("a").unwrap();
    engine.register_consumer("b").unwrap();

    let samples = BTreeMap::from([("gemini".to_string(), vec![50.0, 100.0])]);
    let updates = engine.update_global_weights(&samples).unwrap();
    assert_eq!(updates.len(), 1);
    assert!((updates[0].new_weight - 1.1).abs() < 1e-9);
    assert_eq!(updates[0].consumers_updated, 2);

    assert!((engine.evaluator("gemini").unwrap().current_weight - 1.1).abs() < 1e-9);
    for id in ["a", "b"] {
        let w = engine.consumer(id).unwrap().weight("gemini").unwrap();
        assert!((w - 1.1).abs() < 1e-9);
    }
}

#[test]
fn invalid_samples_change_nothing() {
    let engine = engine_with(false);
    let samples = BTreeMap::from([
        ("claude".to_string(), vec![90.0]),
        ("gemini".to_string(), vec![120.0]),
    ]);
    assert!(engine.update_global_weights(&samples).is_err());
    assert_eq!(engine.evaluator("claude").unwrap().current_weight, 1.0);
}

#[test]
fn operator_sets_recency_sensitivity() {
    let engine = engine_with(false);
    engine.set_recency_sensitivity("gemini", 0.4).unwrap();
    assert_eq!(engine.evaluator("gemini").unwrap().recency_sensitivity, 0.4);
    assert!(engine.set_recency_sensitivity("gemini", -0.1).is_err());
    assert!(engine.set_recency_sensitivity("gemini", f64::NAN).is_err());
    assert!(matches!(
        engine.set_recency_sensitivity("nobody", 0.5).unwrap_err(),
        PrismError::EvaluatorNotFound { .. }
    ));
}
