//! # prism-engine
//!
//! `PrismEngine` owns every component and the shared tables. It is an explicit
//! context object: create one per process (or per test) and pass it around.
//!
//! Data flow: measurement → composite score → recency adjustment → entity
//! and history update; feedback → learner pass → consumer normalization;
//! entity table → leaderboard snapshot.

pub mod engine;
pub mod feedback;
pub mod ingest;
pub mod leaderboard;
pub mod queries;
pub mod state;
pub mod tracing_setup;
pub mod weights;

pub use engine::PrismEngine;
pub use feedback::{FeedbackAck, RecalibrationReport, SensitivityUpdate};
pub use ingest::{IngestRequest, IngestResult};
pub use prism_leaderboard::LeaderboardBuild;
pub use queries::PruneReport;
pub use tracing_setup::init_tracing;
