/// Prism system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lower bound of every score on the 0–100 scale.
pub const MIN_SCORE: f64 = 0.0;

/// Upper bound of every score on the 0–100 scale.
pub const MAX_SCORE: f64 = 100.0;

/// Tolerance used when comparing weight totals.
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Factors every default evaluator starts with.
pub const DEFAULT_FACTORS: [&str; 4] = ["schema", "authority", "structure", "freshness"];

/// Version written into exported engine state.
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Maximum batch size accepted by bulk ingestion.
pub const MAX_BULK_BATCH_SIZE: usize = 10_000;

/// Clamp a value onto the 0–100 score scale.
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(MIN_SCORE, MAX_SCORE)
}
