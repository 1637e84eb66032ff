//! Jacobian assembly helpers.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Coordinate-format accumulator for Jacobian entries.
///
/// Entries pushed for the same position are summed, so every branch can add
/// its own contribution to a shared junction row.
#[derive(Debug, Clone, Default)]
pub struct TripletMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl TripletMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.rows && col < self.cols);
        self.entries.push((row, col, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scatter into a dense matrix for LU factorization.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.rows, self.cols);
        for &(i, j, v) in &self.entries {
            dense[(i, j)] += v;
        }
        dense
    }
}

/// Jacobian by central differences (two residual evaluations per column).
///
/// Column j is perturbed by `epsilon * max(|x_j|, 1)`.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac: Option<DMatrix<f64>> = None;

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        let column = (f_plus - f_minus) / (2.0 * dx);
        jac.get_or_insert_with(|| DMatrix::zeros(column.len(), n))
            .set_column(j, &column);
    }

    Ok(jac.unwrap_or_else(|| DMatrix::zeros(0, 0)))
}
