//! Policy tuning strategies.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::models::policy::keys;
use crate::models::PolicySet;

use super::AgentState;

/// Fill and cost observed after one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub fill_rate: f64,
    pub total_cost: f64,
}

/// Parameter updates proposed for the next iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proposal {
    /// New absolute values by policy key.
    pub updates: BTreeMap<String, f64>,
    /// The strategy considers the search finished.
    pub converged: bool,
}

impl Proposal {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Proposes policy changes from the latest observation.
///
/// `state` holds the previous iteration's fill and cost when `propose` is
/// called; the current values are in `observation`.
pub trait TuningStrategy: Send + Debug {
    /// Strategy name (for logging).
    fn name(&self) -> &'static str;

    /// Proposes updates for the next iteration.
    fn propose(&mut self, policy: &PolicySet, observation: &Observation, state: &AgentState)
        -> Proposal;

    /// Aligns the strategy with the run's fill target and cost budget.
    fn align_goals(&mut self, _target_fill: f64, _max_cost: f64) {}
}

/// Three-phase heuristic balancing fill against cost.
///
/// | Condition | Update |
/// |-----------|--------|
/// | fill < target | specialty-mismatch penalty × 0.8, floored at 500 |
/// | cost > budget | transfer cost weight × 1.2 |
/// | otherwise | transfer weight × 0.9 (floor 0.5), specialty-mismatch × 1.05 (cap 4000) |
///
/// Converged once fill meets the target and cost moved by less than 1% of
/// the previous iteration's cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleHeuristic {
    pub target_fill: f64,
    pub max_cost: f64,
}

impl SimpleHeuristic {
    pub const MOS_DECAY: f64 = 0.8;
    pub const MOS_FLOOR: f64 = 500.0;
    pub const MOS_TIGHTEN: f64 = 1.05;
    pub const MOS_CAP: f64 = 4000.0;
    pub const TRANSFER_GROWTH: f64 = 1.2;
    pub const TRANSFER_DECAY: f64 = 0.9;
    pub const TRANSFER_FLOOR: f64 = 0.5;
    pub const COST_STABLE_FRACTION: f64 = 0.01;

    pub fn new(target_fill: f64, max_cost: f64) -> Self {
        Self {
            target_fill,
            max_cost,
        }
    }
}

impl Default for SimpleHeuristic {
    fn default() -> Self {
        Self::new(0.95, 1e6)
    }
}

impl TuningStrategy for SimpleHeuristic {
    fn name(&self) -> &'static str {
        "simple_heuristic"
    }

    fn propose(
        &mut self,
        policy: &PolicySet,
        observation: &Observation,
        state: &AgentState,
    ) -> Proposal {
        let mos = policy.get(keys::MOS_MISMATCH);
        let transfer = policy.get(keys::TRANSFER_COST_WEIGHT);
        let mut updates = BTreeMap::new();

        if observation.fill_rate < self.target_fill {
            updates.insert(
                keys::MOS_MISMATCH.to_string(),
                (mos * Self::MOS_DECAY).max(Self::MOS_FLOOR),
            );
        } else if observation.total_cost > self.max_cost {
            updates.insert(
                keys::TRANSFER_COST_WEIGHT.to_string(),
                transfer * Self::TRANSFER_GROWTH,
            );
        } else {
            updates.insert(
                keys::TRANSFER_COST_WEIGHT.to_string(),
                (transfer * Self::TRANSFER_DECAY).max(Self::TRANSFER_FLOOR),
            );
            updates.insert(
                keys::MOS_MISMATCH.to_string(),
                (mos * Self::MOS_TIGHTEN).min(Self::MOS_CAP),
            );
        }

        let converged = observation.fill_rate >= self.target_fill
            && (observation.total_cost - state.total_cost).abs()
                < Self::COST_STABLE_FRACTION * state.total_cost.abs();

        Proposal { updates, converged }
    }

    fn align_goals(&mut self, target_fill: f64, max_cost: f64) {
        self.target_fill = target_fill;
        self.max_cost = max_cost;
    }
}
