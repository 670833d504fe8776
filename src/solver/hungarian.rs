//! Exact minimum-cost bipartite matching (Kuhn–Munkres).
//!
//! # Algorithm
//!
//! Shortest augmenting path with row/column potentials. Rows are inserted
//! one at a time; each insertion runs a Dijkstra-like sweep over reduced
//! costs and augments along the cheapest alternating path.
//!
//! Rectangular matrices are solved across the smaller dimension: when there
//! are more rows than columns the matrix is transposed first.
//!
//! # Complexity
//! O(n² · m) for n = min(rows, cols), m = max(rows, cols).

use crate::cost::CostMatrix;
use crate::error::SolverError;

use super::{AssignmentSolver, Matching};

/// Exact Hungarian solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn name(&self) -> &'static str {
        "hungarian"
    }

    fn solve(&self, matrix: &CostMatrix) -> Result<Matching, SolverError> {
        matrix.check_shape()?;
        if matrix.is_empty() {
            return Ok(Matching::default());
        }
        if let Some((row, col)) = matrix.first_non_finite() {
            return Err(SolverError::NonFiniteCost { row, col });
        }

        if matrix.rows() <= matrix.cols() {
            Ok(Matching::new(solve_wide(matrix)))
        } else {
            let pairs = solve_wide(&matrix.transposed())
                .into_iter()
                .map(|(j, i)| (i, j))
                .collect();
            Ok(Matching::new(pairs))
        }
    }
}

/// Solves a matrix with rows <= cols; every row gets matched.
fn solve_wide(a: &CostMatrix) -> Vec<(usize, usize)> {
    let n = a.rows();
    let m = a.cols();

    // 1-based potentials; column 0 is a virtual root.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = a.get(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path back to the root.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    (1..=m)
        .filter(|&j| p[j] != 0)
        .map(|j| (p[j] - 1, j - 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(rows: &[Vec<f64>]) -> (Matching, f64) {
        let m = CostMatrix::from_rows(rows).unwrap();
        let matching = HungarianSolver.solve(&m).unwrap();
        let cost = matching.total_cost(&m);
        (matching, cost)
    }

    /// Brute-force minimum over all injective row → column maps.
    fn brute_force(rows: &[Vec<f64>]) -> f64 {
        fn rec(rows: &[Vec<f64>], i: usize, used: &mut Vec<bool>, acc: f64, best: &mut f64) {
            if i == rows.len() {
                *best = best.min(acc);
                return;
            }
            for j in 0..used.len() {
                if !used[j] {
                    used[j] = true;
                    rec(rows, i + 1, used, acc + rows[i][j], best);
                    used[j] = false;
                }
            }
        }
        let mut best = f64::INFINITY;
        rec(rows, 0, &mut vec![false; rows[0].len()], 0.0, &mut best);
        best
    }

    #[test]
    fn test_classic_3x3() {
        let (matching, cost) = solve(&[
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ]);
        assert_eq!(matching.len(), 3);
        assert!((cost - 5.0).abs() < 1e-10);
        assert_eq!(matching.pairs(), &[(0, 1), (1, 0), (2, 2)]);
    }

    #[test]
    fn test_known_4x4() {
        let (_, cost) = solve(&[
            vec![9.0, 2.0, 7.0, 8.0],
            vec![6.0, 4.0, 3.0, 7.0],
            vec![5.0, 8.0, 1.0, 8.0],
            vec![7.0, 6.0, 9.0, 4.0],
        ]);
        // 2 + 6 + 1 + 4
        assert!((cost - 13.0).abs() < 1e-10);
    }

    #[test]
    fn test_6x6_matches_brute_force() {
        let rows = vec![
            vec![12.0, 7.0, 9.0, 7.0, 9.0, 3.0],
            vec![8.0, 9.0, 6.0, 6.0, 6.0, 11.0],
            vec![7.0, 17.0, 12.0, 14.0, 9.0, 4.0],
            vec![15.0, 14.0, 6.0, 6.0, 10.0, 5.0],
            vec![4.0, 10.0, 7.0, 10.0, 9.0, 8.0],
            vec![3.0, 6.0, 11.0, 9.0, 2.0, 13.0],
        ];
        let (_, cost) = solve(&rows);
        assert!((cost - brute_force(&rows)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_costs() {
        let rows = vec![
            vec![-200.0, 1800.0, 4300.0],
            vec![1800.0, -300.0, 900.0],
            vec![-100.0, -100.0, -150.0],
        ];
        let (_, cost) = solve(&rows);
        assert!((cost - brute_force(&rows)).abs() < 1e-9);
        assert!((cost - (-650.0)).abs() < 1e-9);
    }

    #[test]
    fn test_more_columns_than_rows() {
        let (matching, cost) = solve(&[vec![5.0, 1.0, 9.0, 3.0], vec![2.0, 8.0, 1.5, 7.0]]);
        assert_eq!(matching.len(), 2);
        assert!((cost - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_more_rows_than_columns() {
        let rows = vec![
            vec![10.0, 4.0],
            vec![3.0, 9.0],
            vec![1.0, 8.0],
            vec![6.0, 2.0],
        ];
        let (matching, cost) = solve(&rows);
        assert_eq!(matching.len(), 2);
        assert!((cost - 3.0).abs() < 1e-10);
        assert_eq!(matching.pairs(), &[(2, 0), (3, 1)]);
    }

    #[test]
    fn test_all_zero_matrix() {
        let m = CostMatrix::zeros(4, 3);
        let matching = HungarianSolver.solve(&m).unwrap();
        assert_eq!(matching.len(), 3);
        assert!(matching.is_valid_for(&m));
        assert_eq!(matching.total_cost(&m), 0.0);
    }

    #[test]
    fn test_empty_dimensions() {
        assert!(HungarianSolver.solve(&CostMatrix::zeros(0, 5)).unwrap().is_empty());
        assert!(HungarianSolver.solve(&CostMatrix::zeros(5, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut m = CostMatrix::zeros(2, 2);
        m.set(0, 1, f64::NAN);
        assert_eq!(
            HungarianSolver.solve(&m),
            Err(SolverError::NonFiniteCost { row: 0, col: 1 })
        );
    }
}
