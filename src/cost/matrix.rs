//! Dense soldier × billet cost matrix.

use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// Row-major dense matrix; entry (i, j) is the cost of soldier row `i`
/// filling billet column `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Creates a zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix from nested rows.
    ///
    /// Returns `None` if rows have unequal lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    /// Number of rows (soldiers).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (billets).
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Entry (i, j).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    /// Sets entry (i, j).
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    /// Adds to entry (i, j).
    #[inline]
    pub fn add(&mut self, i: usize, j: usize, delta: f64) {
        self.data[i * self.cols + j] += delta;
    }

    /// Adds a constant to every entry of row `i`.
    pub fn add_to_row(&mut self, i: usize, delta: f64) {
        for v in self.row_mut(i) {
            *v += delta;
        }
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Row `i` as a mutable slice.
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Raw row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Transposed copy.
    pub fn transposed(&self) -> CostMatrix {
        let mut t = CostMatrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.set(j, i, self.get(i, j));
            }
        }
        t
    }

    /// Checks that the data length matches the declared shape.
    ///
    /// Only a deserialized matrix can fail this.
    pub fn check_shape(&self) -> Result<(), SolverError> {
        match self.rows.checked_mul(self.cols) {
            Some(n) if n == self.data.len() => Ok(()),
            _ => Err(SolverError::Dimension {
                rows: self.rows,
                cols: self.cols,
                len: self.data.len(),
            }),
        }
    }

    /// First non-finite entry, if any.
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|v| !v.is_finite())
            .map(|k| (k / self.cols, k % self.cols))
    }

    /// Smallest entry (`None` when empty).
    pub fn min(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::min)
    }

    /// Largest entry (`None` when empty).
    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing() {
        let mut m = CostMatrix::zeros(2, 3);
        m.set(1, 2, 5.0);
        m.add(1, 2, 1.5);
        assert_eq!(m.get(1, 2), 6.5);
        assert_eq!(m.row(1), &[0.0, 0.0, 6.5]);
        m.add_to_row(0, -1.0);
        assert_eq!(m.row(0), &[-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_from_rows_and_transpose() {
        let m = CostMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = m.transposed();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t.get(2, 1), 6.0);
        assert_eq!(m.min(), Some(1.0));
        assert_eq!(m.max(), Some(6.0));

        assert!(CostMatrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_none());
    }

    #[test]
    fn test_degenerate_shapes() {
        let m = CostMatrix::zeros(0, 4);
        assert!(m.is_empty());
        assert_eq!(m.min(), None);
        assert!(CostMatrix::from_rows(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_check_shape() {
        assert!(CostMatrix::zeros(2, 3).check_shape().is_ok());
        assert!(CostMatrix::zeros(0, 0).check_shape().is_ok());

        let bad: CostMatrix = serde_json::from_str(r#"{"rows":2,"cols":2,"data":[1.0]}"#).unwrap();
        assert_eq!(
            bad.check_shape(),
            Err(SolverError::Dimension { rows: 2, cols: 2, len: 1 })
        );
    }

    #[test]
    fn test_first_non_finite() {
        let mut m = CostMatrix::zeros(2, 2);
        assert_eq!(m.first_non_finite(), None);
        m.set(1, 0, f64::INFINITY);
        assert_eq!(m.first_non_finite(), Some((1, 0)));
    }
}
