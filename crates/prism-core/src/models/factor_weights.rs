use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::WEIGHT_EPSILON;
use crate::errors::WeightError;

/// Per-evaluator factor weights, each in [0.0, 1.0].
///
/// Rebalancing through [`FactorWeights::shift_toward`] conserves the total
/// across all factors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorWeights(BTreeMap<String, f64>);

impl FactorWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equal weights summing to 1.0 across the given factors.
    pub fn equal(factors: &[&str]) -> Self {
        if factors.is_empty() {
            return Self::default();
        }
        let w = 1.0 / factors.len() as f64;
        Self(factors.iter().map(|f| (f.to_string(), w)).collect())
    }

    /// Build from `(factor, weight)` pairs, validating every weight.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut weights = Self::default();
        for (factor, weight) in pairs {
            weights.set(factor, weight)?;
        }
        Ok(weights)
    }

    pub fn get(&self, factor: &str) -> Option<f64> {
        self.0.get(factor).copied()
    }

    /// Insert or overwrite a factor weight. Must be finite and in [0, 1].
    pub fn set(&mut self, factor: impl Into<String>, weight: f64) -> Result<(), WeightError> {
        let factor = factor.into();
        WeightError::check_range(&factor, weight, 0.0, 1.0)?;
        self.0.insert(factor, weight);
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, factor: &str) -> bool {
        self.0.contains_key(factor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn factors(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }

    /// Check every stored weight. Used after deserialization.
    pub fn validate(&self) -> Result<(), WeightError> {
        for (factor, weight) in &self.0 {
            WeightError::check_range(factor, *weight, 0.0, 1.0)?;
        }
        Ok(())
    }

    /// Move `delta` onto `factor` and take the opposite amount from the
    /// other factors in proportion to their current weight.
    ///
    /// Donors never drop below `min_weight`; receivers never rise above 1.0.
    /// The target itself is clipped to [0, 1] and does not shrink below
    /// `min_weight` (or its current value, if already lower). Whatever the
    /// other factors cannot absorb is withheld from the target, so the total
    /// is unchanged. Returns the delta actually applied to `factor`.
    pub fn shift_toward(
        &mut self,
        factor: &str,
        delta: f64,
        min_weight: f64,
    ) -> Result<f64, WeightError> {
        let current = self.get(factor).ok_or_else(|| WeightError::UnknownFactor {
            factor: factor.to_string(),
        })?;
        if !delta.is_finite() {
            return Err(WeightError::NotFinite {
                name: factor.to_string(),
                value: delta,
            });
        }
        WeightError::check_range("min_weight", min_weight, 0.0, 1.0)?;

        let lower = min_weight.min(current);
        let target = (current + delta).clamp(lower, 1.0);
        let requested = target - current;
        if requested.abs() < WEIGHT_EPSILON {
            return Ok(0.0);
        }

        let others: Vec<String> = self.0.keys().filter(|k| *k != factor).cloned().collect();
        let applied = if requested > 0.0 {
            self.drain(&others, requested, min_weight)
        } else {
            -self.fill(&others, -requested)
        };

        if let Some(w) = self.0.get_mut(factor) {
            *w = (current + applied).clamp(0.0, 1.0);
        }
        Ok(applied)
    }

    /// Take up to `amount` from `donors`, proportional to weight, floored at
    /// `min_weight`. Returns the amount taken.
    fn drain(&mut self, donors: &[String], amount: f64, min_weight: f64) -> f64 {
        let mut remaining = amount;
        // Each round either finishes or pins at least one donor to the floor.
        for _ in 0..=donors.len() {
            if remaining < WEIGHT_EPSILON {
                break;
            }
            let eligible: Vec<&String> = donors
                .iter()
                .filter(|d| self.0[*d] > min_weight + WEIGHT_EPSILON)
                .collect();
            let pool: f64 = eligible.iter().map(|d| self.0[*d]).sum();
            if eligible.is_empty() || pool <= 0.0 {
                break;
            }
            let mut taken_this_round = 0.0;
            for donor in eligible {
                let w = self.0[donor];
                let share = remaining * w / pool;
                let take = share.min(w - min_weight);
                self.0.insert(donor.clone(), w - take);
                taken_this_round += take;
            }
            remaining -= taken_this_round;
        }
        amount - remaining.max(0.0)
    }

    /// Give up to `amount` to `receivers`, proportional to weight (equal
    /// split when all are zero), capped at 1.0. Returns the amount given.
    fn fill(&mut self, receivers: &[String], amount: f64) -> f64 {
        let mut remaining = amount;
        for _ in 0..=receivers.len() {
            if remaining < WEIGHT_EPSILON {
                break;
            }
            let eligible: Vec<&String> = receivers
                .iter()
                .filter(|r| self.0[*r] < 1.0 - WEIGHT_EPSILON)
                .collect();
            if eligible.is_empty() {
                break;
            }
            let pool: f64 = eligible.iter().map(|r| self.0[*r]).sum();
            let count = eligible.len() as f64;
            let mut given_this_round = 0.0;
            for receiver in eligible {
                let w = self.0[receiver];
                let share = if pool > WEIGHT_EPSILON {
                    remaining * w / pool
                } else {
                    remaining / count
                };
                let give = share.min(1.0 - w);
                self.0.insert(receiver.clone(), w + give);
                given_this_round += give;
            }
            remaining -= given_this_round;
        }
        amount - remaining.max(0.0)
    }
}

impl FromIterator<(String, f64)> for FactorWeights {
    /// Collects without validation, clamping each weight into [0, 1].
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k, if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }))
                .collect(),
        )
    }
}
