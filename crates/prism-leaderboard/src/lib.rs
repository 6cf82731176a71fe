//! # prism-leaderboard
//!
//! Aggregates per-evaluator visibility and quality signals into one ranked,
//! fingerprinted snapshot per rebuild.
//!
//! Ranking is dense 1..n: descending composite, ties broken by ascending
//! entity id.

pub mod builder;
pub mod components;
pub mod fingerprint;
pub mod highlights;
pub mod metrics;
pub mod retention;
pub mod snapshots;

pub use builder::{Leaderboard, LeaderboardBuild};
pub use components::{evaluator_leaderboard_score, ComponentScores};
pub use retention::stale_entity_ids;
pub use snapshots::SnapshotRing;
