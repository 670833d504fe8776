//! Tuning run state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::PolicySet;

/// Lifecycle of a tuning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    #[default]
    Running,
    /// Stopped on small deltas, a strategy signal, or an empty proposal.
    Converged,
    /// Hit the iteration cap.
    Exhausted,
}

/// One observed iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub fill_rate: f64,
    pub total_cost: f64,
    /// Policy the iteration ran under.
    pub policy: PolicySet,
}

/// Mutable state of one tuning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub iteration: usize,
    /// Fill of the most recent completed iteration.
    pub fill_rate: f64,
    /// Cost of the most recent completed iteration.
    pub total_cost: f64,
    /// Latest value applied per tuned key.
    pub tuned_policies: BTreeMap<String, f64>,
    /// Value each tuned key held before its first update.
    pub baseline: BTreeMap<String, f64>,
    pub converged: bool,
    pub history: Vec<IterationRecord>,
}

impl AgentState {
    /// Records updates about to be applied to `policy`.
    pub fn record_updates(&mut self, policy: &PolicySet, updates: &BTreeMap<String, f64>) {
        for (key, value) in updates {
            self.baseline
                .entry(key.clone())
                .or_insert_with(|| policy.get(key));
            self.tuned_policies.insert(key.clone(), *value);
        }
    }

    /// Fractional change of every tuned key against its pre-run value.
    ///
    /// Keys whose baseline is zero are omitted.
    pub fn policy_deltas(&self, current: &PolicySet) -> BTreeMap<String, f64> {
        self.baseline
            .iter()
            .filter(|(_, base)| **base != 0.0)
            .map(|(key, base)| (key.clone(), current.get(key) / base - 1.0))
            .collect()
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.history.last()
    }
}
