//! # prism-scoring
//!
//! Combines category scores into a bounded composite and factor scores into
//! a per-evaluator score. Pure and deterministic.

pub mod composite;
pub mod engine;

pub use composite::{compute_composite, evaluator_score, CompositeScore};
pub use engine::{MeasurementScore, ScoreEngine};
