//! Manpower distribution framework for the U-Engine ecosystem.
//!
//! Assigns soldiers to billets by minimizing a weighted cost: a base cost
//! model built from tunable policy weights, optional penalty passes
//! (readiness, unit cohesion, geography, qualifications), and an exact
//! assignment solver with a greedy fallback. Policies can be tuned
//! iteratively or explored as a multi-objective Pareto frontier.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Soldier`, `Billet`, `PolicySet`,
//!   `MissionProfile`, `AssignmentResult`
//! - **`cost`**: `CostModel`, `CostMatrix`, `TransferCostTable`
//! - **`penalty`**: `PenaltyPass` trait, `PenaltyPipeline` and the four
//!   standard passes with their collaborator data
//! - **`solver`**: `HungarianSolver` (exact), `GreedySolver` (fallback)
//! - **`organizer`**: Supervisor hierarchy, organic teams, `TaskOrganizer`
//! - **`engine`**: `AssignmentEngine` pipeline and sensitivity sweeps
//! - **`tuning`**: `TuningAgent` with pluggable `TuningStrategy`
//! - **`pareto`**: `ParetoOptimizer`, frontier and recommendations
//! - **`validation`**: Input integrity checks (duplicate IDs, rank bands)
//!
//! # Pipeline
//!
//! ```text
//! pools + policy ─▶ CostModel ─▶ PenaltyPipeline ─▶ Hungarian ─▶ rows + summary
//!                                                    └▶ greedy on failure
//! ```
//!
//! # References
//!
//! - Kuhn (1955), "The Hungarian Method for the Assignment Problem"
//! - Burkard, Dell'Amico & Martello (2012), "Assignment Problems"
//! - Deb (2001), "Multi-Objective Optimization using Evolutionary Algorithms"

pub mod cost;
pub mod engine;
pub mod error;
pub mod models;
pub mod organizer;
pub mod pareto;
pub mod penalty;
pub mod solver;
pub mod tuning;
pub mod validation;

pub use error::{EngineError, Result, SolverError};
