//! Iterative policy tuning.
//!
//! A [`TuningAgent`] repeatedly runs the [`AssignmentEngine`](crate::engine::AssignmentEngine)
//! and lets a [`TuningStrategy`] adjust the policy from the observed fill
//! rate and cost.
//!
//! # States
//!
//! | State | Entered when |
//! |-------|--------------|
//! | `Running` | The run starts |
//! | `Converged` | Fill and cost moved less than the tolerances, the strategy flagged convergence, or it proposed nothing |
//! | `Exhausted` | The iteration cap was reached |
//!
//! The agent returns the best result seen (highest fill, then lowest cost),
//! which need not be the last one.

mod agent;
mod state;
mod strategy;

pub use agent::{
    load_policy, policy_path, save_policy, Reflection, TuningAgent, TuningConfig, TuningOutcome,
    REFLECTION_FILL_FLOOR,
};
pub use state::{AgentState, AgentStatus, IterationRecord};
pub use strategy::{Observation, Proposal, SimpleHeuristic, TuningStrategy};
