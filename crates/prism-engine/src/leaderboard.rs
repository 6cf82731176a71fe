use std::sync::atomic::AtomicBool;

use prism_core::errors::PrismResult;
use prism_core::models::{LeaderboardSnapshot, ScoredEntity};
use prism_leaderboard::LeaderboardBuild;

use crate::engine::PrismEngine;

impl PrismEngine {
    /// Rank every entity, store the snapshot, and refresh entity ranks.
    pub fn rebuild_leaderboard(&self) -> PrismResult<LeaderboardBuild> {
        self.rebuild_with(None)
    }

    /// Chunked rebuild that stops with `Cancelled` once `cancel` is set.
    /// A cancelled rebuild stores nothing.
    pub fn rebuild_leaderboard_chunked(&self, cancel: &AtomicBool) -> PrismResult<LeaderboardBuild> {
        self.rebuild_with(Some(cancel))
    }

    /// Retained snapshots, oldest first.
    pub fn snapshots(&self) -> PrismResult<Vec<LeaderboardSnapshot>> {
        Ok(self.read_snapshots()?.to_vec())
    }

    pub fn latest_snapshot(&self) -> PrismResult<Option<LeaderboardSnapshot>> {
        Ok(self.read_snapshots()?.latest().cloned())
    }

    fn rebuild_with(&self, cancel: Option<&AtomicBool>) -> PrismResult<LeaderboardBuild> {
        let mut entities: Vec<ScoredEntity> =
            self.entities.iter().map(|e| e.value().clone()).collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        let evaluators = self.evaluator_table();
        let previous = self.latest_snapshot()?;

        let span = crate::leaderboard_span!(entities.len());
        let _guard = span.enter();

        let build = match cancel {
            Some(flag) => self
                .leaderboard
                .rebuild_chunked(&entities, &evaluators, previous.as_ref(), flag)?,
            None => self
                .leaderboard
                .rebuild(&entities, &evaluators, previous.as_ref())?,
        };

        self.write_snapshots()?.push(build.snapshot.clone());

        {
            let ranks = build.snapshot.rank_index();
            for mut entity in self.entities.iter_mut() {
                entity.rank = ranks.get(entity.key().as_str()).copied();
            }
        }
        Ok(build)
    }
}
