use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use prism_core::config::PrismConfig;
use prism_core::models::{Evaluator, FeedbackRecord, LearningOutcome};
use prism_core::traits::IWeightLearner;
use prism_core::PrismResult;
use prism_engine::PrismEngine;
use prism_learning::FeedbackLearner;
use test_fixtures::{feedback_records, uniform_measurement};

const WRITERS: usize = 4;
const PER_WRITER: usize = 50;
const EVALUATORS: [&str; 5] = ["chatgpt", "claude", "gemini", "perplexity", "copilot"];

#[test]
fn ingestion_feedback_and_recalibration_run_together() {
    let engine = PrismEngine::with_default_evaluators(PrismConfig::default()).unwrap();
    engine.register_consumer("dashboard").unwrap();

    thread::scope(|scope| {
        for w in 0..WRITERS {
            let engine = &engine;
            scope.spawn(move || {
                for i in 0..PER_WRITER {
                    let evaluator = EVALUATORS[(w + i) % EVALUATORS.len()];
                    let score = ((w * 13 + i * 7) % 101) as f64;
                    engine
                        .ingest(&format!("https://w{w}.example/{i}"), evaluator, uniform_measurement(score))
                        .unwrap();
                }
            });
        }
        {
            let engine = &engine;
            scope.spawn(move || {
                for record in feedback_records("claude", "schema", 0.25, 20) {
                    engine.record_feedback(record).unwrap();
                }
            });
        }
        {
            let engine = &engine;
            scope.spawn(move || {
                for _ in 0..5 {
                    engine.recalibrate().unwrap();
                    engine.rebuild_leaderboard().unwrap();
                }
            });
        }
    });

    assert_eq!(engine.entity_count(), WRITERS * PER_WRITER);
    assert_eq!(engine.feedback_count().unwrap(), 20);
    assert_eq!(engine.epoch(), 5);

    let claude = engine.evaluator("claude").unwrap();
    assert!((claude.factor_weights.get("schema").unwrap() - 0.275).abs() < 1e-9);
    assert_eq!(
        engine.consumer("dashboard").unwrap().weights["claude"].factors,
        claude.factor_weights
    );

    let build = engine.rebuild_leaderboard().unwrap();
    assert_eq!(build.snapshot.entries.len(), WRITERS * PER_WRITER);
    for entry in &build.snapshot.entries {
        assert!((0.0..=100.0).contains(&entry.composite_score));
    }
}

/// Learner that parks its first pass over `claude` until released.
struct GatedLearner {
    inner: FeedbackLearner,
    armed: AtomicBool,
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
}

impl IWeightLearner for GatedLearner {
    fn learn(&self, evaluator: &Evaluator, records: &[FeedbackRecord]) -> PrismResult<LearningOutcome> {
        let outcome = self.inner.learn(evaluator, records);
        if evaluator.id == "claude" && self.armed.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        outcome
    }
}

#[test]
fn slow_recalibration_does_not_overwrite_newer_learning() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let mut config = PrismConfig::default();
    config.learning.auto_recalibrate = false;
    let engine = PrismEngine::with_default_evaluators(config)
        .unwrap()
        .with_learner(Box::new(GatedLearner {
            inner: FeedbackLearner::new(),
            armed: AtomicBool::new(true),
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        }));
    engine.register_consumer("dashboard").unwrap();

    let early = feedback_records("claude", "schema", 0.25, 6);
    let late = feedback_records("claude", "authority", 0.3, 6);
    for record in early.clone() {
        engine.record_feedback(record).unwrap();
    }

    let report = thread::scope(|scope| {
        let recalibration = scope.spawn(|| engine.recalibrate().unwrap());

        // The recalibration now holds an outcome built from six records.
        entered.wait();
        for record in late.clone() {
            engine.record_feedback(record).unwrap();
        }
        let newer = engine.learn_evaluator("claude").unwrap();
        assert_eq!(newer.data_points, 12);
        release.wait();

        recalibration.join().unwrap()
    });

    assert!(report.outcomes.iter().all(|o| o.evaluator_id != "claude"));
    assert!(report.skipped.iter().any(|s| s.key == "claude"));

    let all: Vec<FeedbackRecord> = early.into_iter().chain(late).collect();
    let claude = engine.evaluator("claude").unwrap();
    let expected = FeedbackLearner::new().learn(&claude, &all).unwrap();
    assert_eq!(claude.learned_records, 12);
    assert_eq!(claude.factor_weights, expected.new_weights);
    assert!(claude.factor_weights.get("authority").unwrap() > 0.25);
    assert_eq!(
        engine.consumer("dashboard").unwrap().weights["claude"].factors,
        claude.factor_weights
    );
}
