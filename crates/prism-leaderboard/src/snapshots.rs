use std::collections::VecDeque;

use prism_core::models::LeaderboardSnapshot;

/// The last `retention` snapshots, oldest first.
#[derive(Debug, Clone)]
pub struct SnapshotRing {
    snapshots: VecDeque<LeaderboardSnapshot>,
    retention: usize,
}

impl SnapshotRing {
    pub fn new(retention: usize) -> Self {
        let retention = retention.max(1);
        Self {
            snapshots: VecDeque::with_capacity(retention),
            retention,
        }
    }

    /// Append, evicting the oldest snapshot when full.
    pub fn push(&mut self, snapshot: LeaderboardSnapshot) -> Option<LeaderboardSnapshot> {
        let evicted = if self.snapshots.len() >= self.retention {
            self.snapshots.pop_front()
        } else {
            None
        };
        self.snapshots.push_back(snapshot);
        evicted
    }

    pub fn latest(&self) -> Option<&LeaderboardSnapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LeaderboardSnapshot> {
        self.snapshots.iter()
    }

    pub fn to_vec(&self) -> Vec<LeaderboardSnapshot> {
        self.snapshots.iter().cloned().collect()
    }

    /// Replace the contents, keeping only the newest `retention` snapshots.
    pub fn replace(&mut self, mut snapshots: Vec<LeaderboardSnapshot>) {
        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let skip = snapshots.len().saturating_sub(self.retention);
        self.snapshots = snapshots.into_iter().skip(skip).collect();
    }
}
