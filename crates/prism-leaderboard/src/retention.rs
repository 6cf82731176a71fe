use chrono::{DateTime, Duration, Utc};
use prism_core::models::ScoredEntity;

/// Ids of entities without a measurement in the last `retention_days`.
pub fn stale_entity_ids<'a>(
    entities: impl IntoIterator<Item = &'a ScoredEntity>,
    now: DateTime<Utc>,
    retention_days: i64,
) -> Vec<String> {
    let cutoff = now - Duration::days(retention_days);
    let mut ids: Vec<String> = entities
        .into_iter()
        .filter(|e| e.last_updated < cutoff)
        .map(|e| e.id.clone())
        .collect();
    ids.sort();
    ids
}
