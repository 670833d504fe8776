//! Assignment solvers.
//!
//! Turn a cost matrix into a one-to-one matching of rows (soldiers) to
//! columns (billets).
//!
//! - [`HungarianSolver`]: exact minimum-cost matching across the smaller
//!   dimension.
//! - [`GreedySolver`]: per-column cheapest-unused-row fallback. Not optimal,
//!   but deterministic for a fixed column order.
//!
//! Both accept empty and all-zero matrices.
//!
//! # References
//!
//! - Kuhn (1955), "The Hungarian Method for the Assignment Problem"
//! - Munkres (1957), "Algorithms for the Assignment and Transportation Problems"

mod greedy;
mod hungarian;

pub use greedy::GreedySolver;
pub use hungarian::HungarianSolver;

use std::collections::HashSet;
use std::fmt::Debug;

use crate::cost::CostMatrix;
use crate::error::SolverError;

/// A one-to-one matching: `(row, col)` pairs sorted by row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    pairs: Vec<(usize, usize)>,
}

impl Matching {
    /// Builds a matching from pairs (sorted by row).
    pub fn new(mut pairs: Vec<(usize, usize)>) -> Self {
        pairs.sort_unstable();
        Self { pairs }
    }

    /// Matched pairs.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing is matched.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sum of matched costs.
    pub fn total_cost(&self, matrix: &CostMatrix) -> f64 {
        self.pairs.iter().map(|&(i, j)| matrix.get(i, j)).sum()
    }

    /// Whether every row and column appears at most once and the size
    /// does not exceed `min(rows, cols)`.
    pub fn is_valid_for(&self, matrix: &CostMatrix) -> bool {
        let mut rows = HashSet::new();
        let mut cols = HashSet::new();
        self.pairs.len() <= matrix.rows().min(matrix.cols())
            && self.pairs.iter().all(|&(i, j)| {
                i < matrix.rows() && j < matrix.cols() && rows.insert(i) && cols.insert(j)
            })
    }
}

/// A solver producing a matching from a cost matrix.
pub trait AssignmentSolver: Send + Sync + Debug {
    /// Solver name (e.g., "hungarian").
    fn name(&self) -> &'static str;

    /// Solves the matrix.
    fn solve(&self, matrix: &CostMatrix) -> Result<Matching, SolverError>;
}
