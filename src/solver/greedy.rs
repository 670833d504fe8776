//! Greedy per-column assignment.
//!
//! Each column (billet) in order takes the cheapest row (soldier) not yet
//! used. Ties go to the lowest row index. Columns past the point where rows
//! run out stay unmatched.
//!
//! # Complexity
//! O(rows · cols)

use crate::cost::CostMatrix;
use crate::error::SolverError;

use super::{AssignmentSolver, Matching};

/// Greedy fallback solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver;

impl AssignmentSolver for GreedySolver {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, matrix: &CostMatrix) -> Result<Matching, SolverError> {
        matrix.check_shape()?;
        let mut used = vec![false; matrix.rows()];
        let mut pairs = Vec::with_capacity(matrix.rows().min(matrix.cols()));

        for j in 0..matrix.cols() {
            if pairs.len() == matrix.rows() {
                break;
            }
            let mut best: Option<(usize, f64)> = None;
            for (i, taken) in used.iter().enumerate() {
                if *taken {
                    continue;
                }
                let c = matrix.get(i, j);
                // NaN never wins a comparison; such a cell is only taken when
                // nothing else is free.
                match best {
                    None => best = Some((i, c)),
                    Some((_, b)) if c < b || (b.is_nan() && !c.is_nan()) => best = Some((i, c)),
                    _ => {}
                }
            }
            if let Some((i, _)) = best {
                used[i] = true;
                pairs.push((i, j));
            }
        }

        Ok(Matching::new(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_takes_cheapest_per_column() {
        let m = CostMatrix::from_rows(&[
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ])
        .unwrap();
        let matching = GreedySolver.solve(&m).unwrap();
        // col 0 -> row 1, col 1 -> row 0, col 2 -> row 2
        assert_eq!(matching.pairs(), &[(0, 1), (1, 0), (2, 2)]);
        assert!((matching.total_cost(&m) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_can_be_suboptimal() {
        let m = CostMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 100.0]]).unwrap();
        let matching = GreedySolver.solve(&m).unwrap();
        // col 0 grabs row 0, leaving row 1 for col 1
        assert!((matching.total_cost(&m) - 101.0).abs() < 1e-10);
    }

    #[test]
    fn test_ties_go_to_lowest_row() {
        let m = CostMatrix::zeros(3, 3);
        let matching = GreedySolver.solve(&m).unwrap();
        assert_eq!(matching.pairs(), &[(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_fewer_rows_than_columns() {
        let m = CostMatrix::from_rows(&[vec![5.0, 1.0, 0.0]]).unwrap();
        let matching = GreedySolver.solve(&m).unwrap();
        assert_eq!(matching.pairs(), &[(0, 0)]);
    }

    #[test]
    fn test_more_rows_than_columns() {
        let m = CostMatrix::from_rows(&[vec![3.0], vec![1.0], vec![2.0]]).unwrap();
        let matching = GreedySolver.solve(&m).unwrap();
        assert_eq!(matching.pairs(), &[(1, 0)]);
    }

    #[test]
    fn test_empty_and_non_finite() {
        assert!(GreedySolver.solve(&CostMatrix::zeros(0, 3)).unwrap().is_empty());
        assert!(GreedySolver.solve(&CostMatrix::zeros(3, 0)).unwrap().is_empty());

        let m = CostMatrix::from_rows(&[vec![f64::NAN], vec![7.0]]).unwrap();
        assert_eq!(GreedySolver.solve(&m).unwrap().pairs(), &[(1, 0)]);
    }
}
