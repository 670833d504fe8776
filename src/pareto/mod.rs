//! Multi-objective policy exploration.
//!
//! Samples a grid of policy parameter values, runs the engine once per
//! combination and keeps the solutions no other solution dominates.
//!
//! # Objectives
//!
//! | Objective | Direction | Source |
//! |-----------|-----------|--------|
//! | Fill rate | maximize | run summary |
//! | Total cost | minimize | run summary |
//! | Cohesion | maximize | % of capabilities sourced from one unit |
//! | Cross-leveling | minimize | distinct source units, saturating at 10 |
//!
//! A dominates B when A is no worse on every objective and strictly better
//! on at least one.
//!
//! # References
//!
//! - Deb (2001), "Multi-Objective Optimization using Evolutionary Algorithms", Ch. 2
//! - Miettinen (1999), "Nonlinear Multiobjective Optimization", Ch. 3 (reference-point methods)

mod frontier;
mod grid;
mod optimizer;
mod solution;

pub use frontier::{
    compare, pareto_frontier, recommend_balanced, recommend_weighted, BalancedRecommendation,
    ObjectiveDelta, ObjectiveWeights, SolutionComparison, Winner,
};
pub use grid::ParameterGrid;
pub use optimizer::{ParetoConfig, ParetoOptimizer};
pub use solution::{
    cohesion_score, cross_leveling_score, Objectives, ParetoSolution, CROSS_LEVELING_SATURATION,
    NEUTRAL_SCORE,
};
