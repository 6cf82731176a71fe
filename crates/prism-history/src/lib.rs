//! # prism-history
//!
//! Append-only, timestamp-ordered score history per entity, with trend
//! classification over a window and cross-entity summaries.

pub mod store;
pub mod summary;
pub mod trend;

pub use store::ScoreHistory;
pub use trend::{classify, percent_change};
