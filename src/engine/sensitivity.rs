//! One-parameter policy sweep.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::policy::is_known_key;
use crate::models::PolicySet;

use super::AssignmentEngine;

/// Outcome of one sweep value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    /// Value the parameter was set to.
    pub value: f64,
    pub fill_rate: f64,
    pub total_cost: f64,
    pub filled_billets: usize,
}

impl AssignmentEngine {
    /// Runs the pipeline once per value of `key`, all other weights held at
    /// `policy`.
    ///
    /// `policy` itself is never modified.
    ///
    /// # Errors
    /// [`EngineError::Config`] for a key outside the policy catalogue, plus
    /// anything [`run`](Self::run) rejects.
    pub fn sensitivity(
        &self,
        policy: &PolicySet,
        mission: &str,
        key: &str,
        values: &[f64],
    ) -> Result<Vec<SensitivityPoint>> {
        if !is_known_key(key) {
            return Err(EngineError::config(format!("unknown policy key '{key}'")));
        }

        values
            .iter()
            .map(|&value| {
                let probe = policy.clone().with(key, value);
                let summary = self.run(&probe, mission)?.summary;
                tracing::debug!(key, value, fill_rate = summary.fill_rate, "sensitivity point");
                Ok(SensitivityPoint {
                    value,
                    fill_rate: summary.fill_rate,
                    total_cost: summary.total_cost,
                    filled_billets: summary.filled_billets,
                })
            })
            .collect()
    }
}
