//! Passive log of performance-delta samples (old adjusted score vs. a fresh
//! re-measurement). Recording never changes any weight or sensitivity.

use std::collections::{BTreeMap, VecDeque};

use prism_core::config::defaults::DEFAULT_MAX_DECAY_SAMPLES;
use prism_core::models::PerformanceDeltaSample;

/// Bounded per-evaluator sample log. Oldest samples are evicted first.
#[derive(Debug, Clone)]
pub struct RecencySampleLog {
    samples: BTreeMap<String, VecDeque<PerformanceDeltaSample>>,
    max_per_evaluator: usize,
}

impl RecencySampleLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_DECAY_SAMPLES)
    }

    pub fn with_capacity(max_per_evaluator: usize) -> Self {
        Self {
            samples: BTreeMap::new(),
            max_per_evaluator: max_per_evaluator.max(1),
        }
    }

    pub fn record(&mut self, sample: PerformanceDeltaSample) {
        let queue = self
            .samples
            .entry(sample.evaluator_id.clone())
            .or_default();
        if queue.len() >= self.max_per_evaluator {
            queue.pop_front();
        }
        queue.push_back(sample);
    }

    pub fn samples_for<'a>(
        &'a self,
        evaluator_id: &str,
    ) -> impl Iterator<Item = &'a PerformanceDeltaSample> + 'a {
        self.samples.get(evaluator_id).into_iter().flatten()
    }

    pub fn count_for(&self, evaluator_id: &str) -> usize {
        self.samples.get(evaluator_id).map_or(0, VecDeque::len)
    }

    pub fn len(&self) -> usize {
        self.samples.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mean relative drop across an evaluator's samples.
    pub fn mean_relative_drop(&self, evaluator_id: &str) -> Option<f64> {
        let queue = self.samples.get(evaluator_id)?;
        if queue.is_empty() {
            return None;
        }
        Some(queue.iter().map(PerformanceDeltaSample::relative_drop).sum::<f64>() / queue.len() as f64)
    }
}

impl Default for RecencySampleLog {
    fn default() -> Self {
        Self::new()
    }
}
