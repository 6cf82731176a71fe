//! # prism-learning
//!
//! Nudges an evaluator's factor weights toward the remediation strategies that
//! actually moved its scores. Bounded, deterministic, linear: every pass starts
//! from the evaluator's base factor weights and replays the full feedback
//! aggregate, so reprocessing the same records gives the same weights.

pub mod aggregation;
pub mod effectiveness;
pub mod engine;

pub use aggregation::{aggregate_impacts, ImpactAggregate};
pub use effectiveness::strategy_effectiveness;
pub use engine::FeedbackLearner;
