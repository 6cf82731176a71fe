// Single source of truth for all default values.

// --- Scoring (category weights) ---
pub const DEFAULT_WEIGHT_TECHNICAL: f64 = 0.20;
pub const DEFAULT_WEIGHT_CONTENT: f64 = 0.25;
pub const DEFAULT_WEIGHT_EVALUATOR_SPECIFIC: f64 = 0.20;
pub const DEFAULT_WEIGHT_EXTERNAL_REFERENCE: f64 = 0.15;
pub const DEFAULT_WEIGHT_FRESHNESS: f64 = 0.10;
pub const DEFAULT_WEIGHT_TRUST: f64 = 0.10;

// --- Decay ---
pub const DEFAULT_DECAY_PERIOD_DAYS: f64 = 180.0;
pub const DEFAULT_MAX_DEGRADATION: f64 = 0.3;
pub const DEFAULT_RECENCY_SENSITIVITY: f64 = 0.7;
pub const DEFAULT_MAX_DECAY_SAMPLES: usize = 1_000;

// --- Learning ---
pub const DEFAULT_MIN_DATA_POINTS: usize = 5;
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 0.1;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_MIN_FACTOR_WEIGHT: f64 = 0.1;
pub const DEFAULT_AUTO_RECALIBRATE: bool = true;
pub const DEFAULT_ADJUST_RECENCY_SENSITIVITY: bool = false;

// --- Normalizer ---
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.1;
pub const DEFAULT_CONSISTENCY_TOLERANCE: f64 = 0.2;
pub const DEFAULT_HARD_CORRECTION_LIMIT: f64 = 1.0;
pub const DEFAULT_MIN_CONSUMER_WEIGHT: f64 = 0.1;
pub const DEFAULT_MAX_CONSUMER_WEIGHT: f64 = 2.0;
pub const DEFAULT_MIN_GLOBAL_WEIGHT: f64 = 0.5;
pub const DEFAULT_MAX_GLOBAL_WEIGHT: f64 = 1.5;

// --- Leaderboard ---
pub const DEFAULT_MIN_SCORE: f64 = 0.0;
pub const DEFAULT_SNAPSHOT_RETENTION: usize = 30;
pub const DEFAULT_ENTITY_RETENTION_DAYS: i64 = 90;
pub const DEFAULT_CITATION_CAP: u32 = 5;
pub const DEFAULT_MAX_RESPONSE_MS: f64 = 10_000.0;
pub const DEFAULT_HIGH_PERFORMER_THRESHOLD: f64 = 80.0;
pub const DEFAULT_REBUILD_CHUNK_SIZE: usize = 500;
pub const DEFAULT_COMPONENT_CITATION: f64 = 0.25;
pub const DEFAULT_COMPONENT_INCLUSION: f64 = 0.25;
pub const DEFAULT_COMPONENT_CONFIDENCE: f64 = 0.15;
pub const DEFAULT_COMPONENT_RESPONSE_TIME: f64 = 0.10;
pub const DEFAULT_COMPONENT_QUALITY: f64 = 0.25;

// --- History ---
pub const DEFAULT_TREND_THRESHOLD_PERCENT: f64 = 5.0;
pub const DEFAULT_MAX_POINTS_PER_ENTITY: usize = 1_000;
pub const DEFAULT_TOP_MOVERS: usize = 5;
pub const DEFAULT_TREND_WINDOW_DAYS: i64 = 30;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
