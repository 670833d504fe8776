//! Candidate values per policy parameter.

use rand::seq::index;
use rand::Rng;
use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::models::policy::is_known_key;

/// Named candidate values per policy parameter.
///
/// Combinations enumerate like nested loops in insertion order: the last
/// parameter varies fastest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterGrid {
    params: Vec<(String, Vec<f64>)>,
}

impl ParameterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a parameter's candidate values.
    pub fn with(mut self, key: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        let key = key.into();
        let values = values.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.params.push((key, values)),
        }
        self
    }

    /// Parameter names in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.params.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Number of combinations in the full Cartesian product.
    ///
    /// An empty grid has one combination: the base policy unchanged.
    pub fn len(&self) -> usize {
        self.params
            .iter()
            .map(|(_, v)| v.len())
            .fold(1usize, |acc, n| acc.saturating_mul(n))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rejects keys outside the policy catalogue and parameters without
    /// candidate values.
    pub fn validate(&self) -> Result<()> {
        for (key, values) in &self.params {
            if !is_known_key(key) {
                return Err(EngineError::config(format!("unknown policy key '{key}' in grid")));
            }
            if values.is_empty() {
                return Err(EngineError::config(format!("parameter '{key}' has no candidate values")));
            }
            if let Some(v) = values.iter().find(|v| !v.is_finite()) {
                return Err(EngineError::MalformedPolicy {
                    key: key.clone(),
                    reason: format!("grid value {v} is not finite"),
                });
            }
        }
        Ok(())
    }

    /// The combination at `index` (mixed-radix decoding).
    pub fn combination(&self, mut index: usize) -> Option<BTreeMap<String, f64>> {
        if index >= self.len() {
            return None;
        }
        let mut combo = BTreeMap::new();
        for (key, values) in self.params.iter().rev() {
            combo.insert(key.clone(), values[index % values.len()]);
            index /= values.len();
        }
        Some(combo)
    }

    /// Every combination, in enumeration order.
    pub fn combinations(&self) -> Vec<BTreeMap<String, f64>> {
        (0..self.len()).filter_map(|i| self.combination(i)).collect()
    }

    /// At most `max` combinations: all of them when the product fits,
    /// otherwise a uniform sample without replacement, in enumeration order.
    pub fn sample<R: Rng>(&self, max: usize, rng: &mut R) -> Vec<BTreeMap<String, f64>> {
        let total = self.len();
        if total <= max {
            return self.combinations();
        }
        let mut picked = index::sample(rng, total, max).into_vec();
        picked.sort_unstable();
        picked
            .into_iter()
            .filter_map(|i| self.combination(i))
            .collect()
    }
}
