use prism_core::models::LeaderboardEntry;

/// blake3 over the ranking: rank, entity id, composite and per-evaluator
/// scores of every entry. Snapshot ids and timestamps are not part of it.
pub fn ranking_fingerprint(entries: &[LeaderboardEntry]) -> String {
    let mut hasher = blake3::Hasher::new();
    for entry in entries {
        hasher.update(&(entry.rank as u64).to_le_bytes());
        hasher.update(entry.entity_id.as_bytes());
        hasher.update(&[0]);
        hasher.update(&entry.composite_score.to_bits().to_le_bytes());
        for (evaluator_id, score) in &entry.evaluator_scores {
            hasher.update(evaluator_id.as_bytes());
            hasher.update(&[0]);
            hasher.update(&score.to_bits().to_le_bytes());
        }
        hasher.update(&[0xff]);
    }
    hasher.finalize().to_hex().to_string()
}
