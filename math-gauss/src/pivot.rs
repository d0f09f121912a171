//! Partial pivot selection

use crate::error::{GaussError, Result};
use crate::matrix::AugmentedMatrix;

/// Pivot chosen for one elimination step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    /// Row holding the largest-magnitude entry of the pivot column
    pub row: usize,
    /// The (signed) entry at `[row, k]`
    pub value: f64,
}

/// Find the row in `k..n` with the largest `|matrix[row][k]|`
///
/// Every candidate is compared by absolute value, including row `k` itself,
/// and the whole range is scanned. Ties go to the smallest row index. NaN
/// entries never win over a number, wherever they sit in the column.
///
/// Returns [`GaussError::Singular`] when the largest magnitude is exactly zero
/// or every candidate is NaN.
pub fn select_pivot(matrix: &AugmentedMatrix, k: usize) -> Result<Pivot> {
    let n = matrix.n();
    if k >= n {
        return Err(GaussError::OutOfBounds {
            row: k,
            col: k,
            rows: n,
            cols: matrix.cols(),
        });
    }

    let column = matrix.as_array().column(k);
    let mut best = Pivot {
        row: k,
        value: column[k],
    };
    let mut best_abs = best.value.abs();

    for row in (k + 1)..n {
        let candidate = column[row].abs();
        if candidate > best_abs || (best_abs.is_nan() && !candidate.is_nan()) {
            best_abs = candidate;
            best = Pivot {
                row,
                value: column[row],
            };
        }
    }

    if best_abs == 0.0 || best_abs.is_nan() {
        return Err(GaussError::Singular { step: k });
    }

    Ok(best)
}
