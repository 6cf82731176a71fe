use prism_core::config::LearningConfig;
use prism_core::models::{default_evaluators, AppliedChange, Evaluator, FeedbackRecord};
use prism_core::traits::IWeightLearner;
use prism_core::PrismError;
use prism_learning::FeedbackLearner;

fn claude() -> Evaluator {
    default_evaluators()
        .into_iter()
        .find(|e| e.id == "claude")
        .unwrap()
}

fn schema_records(n: usize, impact: f64) -> Vec<FeedbackRecord> {
    (0..n)
        .map(|i| {
            FeedbackRecord::new(
                "claude",
                format!("https://site.example/{i}"),
                40.0,
                48.0,
                vec![AppliedChange::new("schema", impact, true)],
            )
            .with_confidence(0.8)
        })
        .collect()
}

// ── Weight nudging ──────────────────────────────────────────────────────

#[test]
fn six_schema_records_move_schema_weight() {
    let learner = FeedbackLearner::new();
    let outcome = learner.learn(&claude(), &schema_records(6, 0.25)).unwrap();

    let w = &outcome.new_weights;
    assert!((w.get("schema").unwrap() - 0.275).abs() < 1e-9);
    for f in ["authority", "structure", "freshness"] {
        assert!((w.get(f).unwrap() - (0.25 - 0.025 / 3.0)).abs() < 1e-9);
    }
    assert!((w.total() - 1.0).abs() < 1e-9);
    assert_eq!(outcome.adjustments.len(), 1);
    assert_eq!(outcome.adjustments[0].sample_count, 6);
    assert_eq!(outcome.data_points, 6);
}

#[test]
fn negative_average_shrinks_factor() {
    let learner = FeedbackLearner::new();
    let outcome = learner.learn(&claude(), &schema_records(5, -0.5)).unwrap();
    assert!((outcome.new_weights.get("schema").unwrap() - 0.2).abs() < 1e-9);
    assert!((outcome.new_weights.total() - 1.0).abs() < 1e-9);
}

#[test]
fn insignificant_impact_leaves_base_weights() {
    let learner = FeedbackLearner::new();
    let outcome = learner.learn(&claude(), &schema_records(6, 0.1)).unwrap();
    assert!(outcome.adjustments.is_empty());
    assert_eq!(outcome.new_weights, claude().base_factor_weights);
}

#[test]
fn reprocessing_is_idempotent() {
    let learner = FeedbackLearner::new();
    let records = schema_records(7, 0.3);
    let mut evaluator = claude();

    let first = learner.learn(&evaluator, &records).unwrap();
    evaluator.factor_weights = first.new_weights.clone();
    let second = learner.learn(&evaluator, &records).unwrap();

    assert_eq!(first.new_weights, second.new_weights);
    assert!(!second.changed());
}

#[test]
fn aliases_route_change_types_to_factors() {
    let mut config = LearningConfig::default();
    config
        .change_type_aliases
        .insert("add_json_ld".to_string(), "schema".to_string());
    let learner = FeedbackLearner::with_config(config);

    let records: Vec<_> = (0..5)
        .map(|i| {
            FeedbackRecord::new(
                "claude",
                format!("e{i}"),
                30.0,
                35.0,
                vec![AppliedChange::new("add_json_ld", 0.5, true)],
            )
        })
        .collect();
    let outcome = learner.learn(&claude(), &records).unwrap();
    assert_eq!(outcome.adjustments[0].factor, "schema");
    assert!(outcome.new_weights.get("schema").unwrap() > 0.25);
}

#[test]
fn unknown_change_types_are_ignored() {
    let learner = FeedbackLearner::new();
    let records: Vec<_> = (0..5)
        .map(|i| {
            FeedbackRecord::new(
                "claude",
                format!("e{i}"),
                30.0,
                35.0,
                vec![AppliedChange::new("tweet_more", 0.9, true)],
            )
        })
        .collect();
    let outcome = learner.learn(&claude(), &records).unwrap();
    assert!(outcome.adjustments.is_empty());
}

// ── Data sufficiency ────────────────────────────────────────────────────

#[test]
fn zero_records_is_not_an_error() {
    let learner = FeedbackLearner::new();
    let evaluator = claude();
    let outcome = learner.learn(&evaluator, &[]).unwrap();
    assert_eq!(outcome.new_weights, evaluator.factor_weights);
    assert_eq!(outcome.data_points, 0);
}

#[test]
fn too_few_records_is_insufficient_data() {
    let learner = FeedbackLearner::new();
    let err = learner.learn(&claude(), &schema_records(3, 0.4)).unwrap_err();
    match err {
        PrismError::InsufficientData {
            available,
            required,
            ..
        } => {
            assert_eq!(available, 3);
            assert_eq!(required, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(learner
        .learn(&claude(), &schema_records(3, 0.4))
        .unwrap_err()
        .is_non_fatal());
}

#[test]
fn other_evaluators_records_are_ignored() {
    let learner = FeedbackLearner::new();
    let mut records = schema_records(2, 0.4);
    for r in &mut records {
        r.evaluator_id = "gemini".to_string();
    }
    let outcome = learner.learn(&claude(), &records).unwrap();
    assert_eq!(outcome.data_points, 0);
}

// ── Confidence ──────────────────────────────────────────────────────────

#[test]
fn confidence_saturates_at_four_times_minimum() {
    let learner = FeedbackLearner::new();
    let partial = learner.learn(&claude(), &schema_records(10, 0.3)).unwrap();
    assert!((partial.confidence - 0.8 * 0.5).abs() < 1e-9);
    let full = learner.learn(&claude(), &schema_records(40, 0.3)).unwrap();
    assert!((full.confidence - 0.8).abs() < 1e-9);
}

// ── Strategy effectiveness ──────────────────────────────────────────────

#[test]
fn strategy_effectiveness_is_sorted_by_impact() {
    let learner = FeedbackLearner::new();
    let records = vec![
        FeedbackRecord::new(
            "claude",
            "a",
            40.0,
            50.0,
            vec![
                AppliedChange::new("schema", 0.6, true),
                AppliedChange::new("authority", 0.1, true),
            ],
        ),
        FeedbackRecord::new(
            "claude",
            "b",
            50.0,
            45.0,
            vec![AppliedChange::new("authority", -0.3, true)],
        ),
    ];
    let stats = learner.strategy_effectiveness(&records);
    assert_eq!(stats[0].change_type, "schema");
    assert_eq!(stats[1].change_type, "authority");
    assert_eq!(stats[1].applications, 2);
    assert_eq!(stats[1].positive, 1);
    assert_eq!(stats[1].negative, 1);
    assert!((stats[1].average_impact + 0.1).abs() < 1e-12);
}
