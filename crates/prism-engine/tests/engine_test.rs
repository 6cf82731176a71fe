use prism_core::config::PrismConfig;
use prism_core::models::{Category, RawMeasurement, TrendDirection, ValidationStatus};
use prism_core::PrismError;
use prism_engine::{IngestRequest, PrismEngine};
use test_fixtures::{days_ago, reference_now, uniform_measurement, visibility};

fn engine() -> PrismEngine {
    PrismEngine::with_default_evaluators(PrismConfig::default()).unwrap()
}

// ── Ingestion ───────────────────────────────────────────────────────────

#[test]
fn ingest_scores_and_stores_entity() {
    let engine = engine();
    let result = engine
        .ingest("https://a.example", "claude", uniform_measurement(80.0).measured_at(reference_now()))
        .unwrap();

    assert!((result.raw_score - 80.0).abs() < 1e-9);
    assert!((result.adjusted_score - 80.0).abs() < 1e-9);
    assert!((result.composite_score - 80.0).abs() < 1e-9);

    let entity = engine.entity("https://a.example").unwrap();
    assert_eq!(entity.evaluator_scores.len(), 1);
    assert_eq!(entity.first_seen, reference_now());
}

#[test]
fn old_content_is_discounted_by_evaluator_sensitivity() {
    let engine = engine();
    let result = engine
        .ingest("e", "perplexity", uniform_measurement(100.0).with_content_age(365.0))
        .unwrap();
    assert!((result.adjusted_score - 73.0).abs() < 1e-9);
    assert!((result.decay.floor - 70.0).abs() < 1e-9);

    let claude = engine
        .ingest("e", "claude", uniform_measurement(100.0).with_content_age(365.0))
        .unwrap();
    assert!((claude.adjusted_score - 85.0).abs() < 1e-9);
    // Composite is the mean of the two evaluators.
    assert!((claude.composite_score - 79.0).abs() < 1e-9);
}

#[test]
fn negative_age_counts_as_fresh() {
    let engine = engine();
    let result = engine
        .ingest("e", "gemini", uniform_measurement(60.0).with_content_age(-4.0))
        .unwrap();
    assert!((result.adjusted_score - 60.0).abs() < 1e-9);
}

#[test]
fn factor_scores_feed_the_evaluator_specific_category() {
    let engine = engine();
    let m = RawMeasurement::new()
        .with_factor("schema", 100.0)
        .with_factor("authority", 0.0)
        .with_factor("structure", 100.0)
        .with_factor("freshness", 0.0);
    let result = engine.ingest("e", "copilot", m).unwrap();
    assert!((result.raw_score - 50.0).abs() < 1e-9);
}

#[test]
fn invalid_measurements_are_rejected() {
    let engine = engine();
    let err = engine.ingest("e", "claude", RawMeasurement::new()).unwrap_err();
    assert!(matches!(err, PrismError::ValidationError(_)));

    let err = engine
        .ingest("e", "claude", RawMeasurement::new().with_category(Category::Trust, 140.0))
        .unwrap_err();
    assert!(matches!(err, PrismError::ValidationError(_)));

    let err = engine
        .ingest("e", "bard", uniform_measurement(50.0))
        .unwrap_err();
    assert!(matches!(err, PrismError::EvaluatorNotFound { .. }));

    let err = engine
        .ingest(
            "e",
            "claude",
            uniform_measurement(50.0).with_visibility(visibility(1, true, 3.0, None)),
        )
        .unwrap_err();
    assert!(matches!(err, PrismError::ValidationError(_)));
    assert_eq!(engine.entity_count(), 0);
}

#[test]
fn batch_isolates_failures() {
    let engine = engine();
    let requests = vec![
        IngestRequest {
            entity_id: "ok-1".into(),
            evaluator_id: "claude".into(),
            measurement: uniform_measurement(70.0),
        },
        IngestRequest {
            entity_id: "bad".into(),
            evaluator_id: "nobody".into(),
            measurement: uniform_measurement(70.0),
        },
        IngestRequest {
            entity_id: "ok-2".into(),
            evaluator_id: "gemini".into(),
            measurement: uniform_measurement(40.0),
        },
    ];
    let outcome = engine.ingest_batch(requests).unwrap();
    assert_eq!(outcome.succeeded.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].key, "bad");
    assert!(!outcome.is_complete());
}

// ── History and deltas ──────────────────────────────────────────────────

#[test]
fn deltas_and_trend_follow_history() {
    let engine = engine();
    engine
        .ingest("e", "claude", uniform_measurement(50.0).measured_at(days_ago(10)))
        .unwrap();
    let result = engine
        .ingest("e", "claude", uniform_measurement(70.0).measured_at(days_ago(0)))
        .unwrap();

    assert_eq!(result.deltas.weekly, Some(20.0));
    assert_eq!(result.deltas.daily, Some(20.0));
    assert_eq!(result.deltas.monthly, None);
    assert_eq!(engine.entity("e").unwrap().deltas, result.deltas);

    let trend = engine.get_trend("e", 36_500).unwrap();
    assert_eq!(trend.direction, TrendDirection::Improving);
    assert!((trend.percent_change - 40.0).abs() < 1e-9);
}

#[test]
fn older_measurement_does_not_replace_newer_score() {
    let engine = engine();
    engine
        .ingest("e", "claude", uniform_measurement(90.0).measured_at(days_ago(1)))
        .unwrap();
    let late = engine
        .ingest("e", "claude", uniform_measurement(10.0).measured_at(days_ago(20)))
        .unwrap();

    assert!((late.adjusted_score - 10.0).abs() < 1e-9);
    assert!((late.composite_score - 90.0).abs() < 1e-9);

    let entity = engine.entity("e").unwrap();
    let stored = &entity.evaluator_scores["claude"];
    assert!((stored.adjusted_score - 90.0).abs() < 1e-9);
    assert_eq!(stored.measured_at, days_ago(1));
    assert!((entity.composite_score - 90.0).abs() < 1e-9);
    assert_eq!(entity.first_seen, days_ago(20));

    // The late measurement still lands in history, in timestamp order.
    let trend = engine.get_trend("e", 36_500).unwrap();
    let scores: Vec<f64> = trend.points.iter().map(|p| p.composite_score).collect();
    assert_eq!(scores.len(), 2);
    assert!((scores[0] - 10.0).abs() < 1e-9);
    assert!((scores[1] - 90.0).abs() < 1e-9);
}

#[test]
fn summary_counts_validation_and_issues() {
    let engine = engine();
    engine
        .ingest(
            "e",
            "claude",
            uniform_measurement(50.0)
                .with_validation(ValidationStatus::Validated)
                .with_issue("missing-schema"),
        )
        .unwrap();
    engine
        .ingest("f", "claude", uniform_measurement(70.0).with_issue("missing-schema"))
        .unwrap();
    let summary = engine.history_summary(30);
    assert_eq!(summary.tracked_entities, 2);
    assert!((summary.validation_rate - 0.5).abs() < 1e-9);
    assert_eq!(summary.common_issues[0].count, 2);
}

#[test]
fn unknown_entity_trend_is_not_found() {
    let engine = engine();
    assert!(matches!(
        engine.get_trend("nope", 30).unwrap_err(),
        PrismError::EntityNotFound { .. }
    ));
}

// ── Leaderboard and retention ───────────────────────────────────────────

#[test]
fn rebuild_ranks_entities_and_keeps_snapshots() {
    let mut config = PrismConfig::default();
    config.leaderboard.snapshot_retention = 2;
    let engine = PrismEngine::with_default_evaluators(config).unwrap();
    engine.ingest("b", "claude", uniform_measurement(60.0)).unwrap();
    engine.ingest("a", "claude", uniform_measurement(60.0)).unwrap();
    engine.ingest("c", "gemini", uniform_measurement(90.0)).unwrap();

    let build = engine.rebuild_leaderboard().unwrap();
    let order: Vec<&str> = build
        .snapshot
        .entries
        .iter()
        .map(|e| e.entity_id.as_str())
        .collect();
    assert_eq!(order, vec!["c", "a", "b"]);
    assert_eq!(engine.entity("a").unwrap().rank, Some(2));

    engine.rebuild_leaderboard().unwrap();
    engine.rebuild_leaderboard().unwrap();
    let snapshots = engine.snapshots().unwrap();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].fingerprint, snapshots[1].fingerprint);
}

#[test]
fn cancelled_rebuild_stores_nothing() {
    let engine = engine();
    engine.ingest("a", "claude", uniform_measurement(60.0)).unwrap();
    let cancel = std::sync::atomic::AtomicBool::new(true);
    let err = engine.rebuild_leaderboard_chunked(&cancel).unwrap_err();
    assert!(matches!(err, PrismError::Cancelled { .. }));
    assert!(engine.snapshots().unwrap().is_empty());
}

#[test]
fn prune_removes_stale_entities_everywhere() {
    let engine = engine();
    engine
        .ingest("old", "claude", uniform_measurement(60.0).measured_at(days_ago(120)))
        .unwrap();
    engine
        .ingest("new", "claude", uniform_measurement(60.0).measured_at(days_ago(10)))
        .unwrap();

    let report = engine.prune(reference_now()).unwrap();
    assert_eq!(report.entities_removed, vec!["old".to_string()]);
    assert_eq!(report.history_points_removed, 1);
    assert!(engine.entity("old").is_none());
    assert!(engine.get_trend("old", 365).is_err());

    let build = engine.rebuild_leaderboard().unwrap();
    assert!(build.snapshot.rank_of("old").is_none());
    assert_eq!(build.snapshot.rank_of("new"), Some(1));
}

// ── Configuration ───────────────────────────────────────────────────────

#[test]
fn engine_loads_from_toml() {
    let engine = PrismEngine::from_toml("[learning]\nmin_data_points = 3\n").unwrap();
    assert_eq!(engine.config().learning.min_data_points, 3);
    assert_eq!(engine.evaluators().len(), 5);

    let err = PrismEngine::from_toml("[decay]\ndecay_period_days = -1.0\n").err().unwrap();
    assert!(matches!(err, PrismError::ConfigError(_)));
}

#[test]
fn duplicate_evaluator_is_rejected() {
    let engine = engine();
    let claude = engine.evaluator("claude").unwrap();
    assert!(engine.register_evaluator(claude).is_err());
}

#[test]
fn tracing_init_is_idempotent() {
    let config = prism_core::config::ObservabilityConfig::default();
    assert!(prism_engine::init_tracing(&config).is_ok());
    assert!(prism_engine::init_tracing(&config).is_ok());
}
