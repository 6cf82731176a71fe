//! # prism-decay
//!
//! Recency discount: `score × (1 − min(age/period, 1) × max_degradation × sensitivity)`,
//! never below `score × (1 − max_degradation)`.
//! Also keeps a passive log of old-vs-remeasured performance samples.

pub mod engine;
pub mod formula;
pub mod samples;

pub use engine::TemporalDecayModel;
pub use samples::RecencySampleLog;
