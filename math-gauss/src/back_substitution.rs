//! Back substitution on an upper triangular augmented matrix
//!
//! Runs serially: `x[i]` depends on every `x[j]` with `j > i`.

use crate::error::{GaussError, Result};
use crate::matrix::AugmentedMatrix;
use ndarray::Array1;

/// Recover the solution vector from a triangularized matrix
///
/// Entries below the diagonal are ignored. A diagonal entry that is exactly
/// zero yields [`GaussError::Singular`] with `step` set to that row.
pub fn back_substitute(matrix: &AugmentedMatrix) -> Result<Array1<f64>> {
    let n = matrix.n();
    let a = matrix.as_array();
    let mut sol = Array1::<f64>::zeros(n);

    for x in (0..n).rev() {
        let diag = a[[x, x]];
        if diag == 0.0 {
            return Err(GaussError::Singular { step: x });
        }
        let mut value = a[[x, n]];
        for y in (x + 1)..n {
            value -= a[[x, y]] * sol[y];
        }
        sol[x] = value / diag;
    }

    Ok(sol)
}
