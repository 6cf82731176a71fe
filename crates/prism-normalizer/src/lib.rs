//! # prism-normalizer
//!
//! Keeps consumer copies of evaluator weights close to the canonical set.
//! Drift above the threshold is half-corrected per pass; drift beyond the hard
//! limit is reported as a violation but still only corrected by one capped step.

pub mod correction;
pub mod engine;
pub mod global;

pub use correction::{drift_factor, half_correction, Correction};
pub use engine::{propagate, sync_factor_copy, WeightNormalizer};
pub use global::{canonical_weight, normalized_performance};
