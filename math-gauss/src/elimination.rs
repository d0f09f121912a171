//! Row elimination
//!
//! [`eliminate_rows`] is the unit of work handed to one worker for one step:
//! it receives the pivot row read-only and exclusive access to a contiguous
//! block of rows below it. Since the block is a mutable view split off the
//! matrix, two workers can never touch the same row and nobody can write the
//! pivot row while a step is running.

use crate::error::{GaussError, Result};
use crate::matrix::AugmentedMatrix;
use crate::partition::RowRange;
use crate::pivot::select_pivot;
use ndarray::{ArrayView1, ArrayViewMut2, s};
use std::time::{Duration, Instant};

/// Eliminate column `k` from every row of `rows`
///
/// `rows` must be exactly the rows of `range` (so `rows.nrows() == range.len()`)
/// and `range.start` must lie strictly below the pivot row `k`. For each row
/// `x`, with `f = x[k] / pivot[k]`, columns `k+1..=n` are updated as
/// `x[y] -= pivot[y] * f` and `x[k]` is set to exactly `0.0`.
///
/// A range that does not satisfy these conditions is rejected with
/// [`GaussError::WorkerFailure`] before any row is modified.
pub fn eliminate_rows(
    worker: usize,
    k: usize,
    range: RowRange,
    pivot_row: ArrayView1<'_, f64>,
    mut rows: ArrayViewMut2<'_, f64>,
) -> Result<()> {
    let fail = |reason: String| GaussError::WorkerFailure {
        worker,
        start: range.start,
        end: range.end,
        reason,
    };

    if range.start <= k {
        return Err(fail(format!("range starts at or above pivot row {}", k)));
    }
    if rows.nrows() != range.len() {
        return Err(fail(format!(
            "range covers {} rows but {} were lent",
            range.len(),
            rows.nrows()
        )));
    }
    if rows.ncols() != pivot_row.len() || k >= pivot_row.len() {
        return Err(fail(format!(
            "column mismatch: pivot row has {}, block has {}",
            pivot_row.len(),
            rows.ncols()
        )));
    }

    let pivot = pivot_row[k];
    if pivot == 0.0 {
        return Err(fail(format!("zero pivot at step {}", k)));
    }

    let pivot_tail = pivot_row.slice(s![k + 1..]);
    for mut row in rows.outer_iter_mut() {
        let f = row[k] / pivot;
        row.slice_mut(s![k + 1..])
            .zip_mut_with(&pivot_tail, |x, &p| *x -= p * f);
        row[k] = 0.0;
    }

    Ok(())
}

/// Single-threaded triangularization, used as a reference for the parallel path
///
/// Applies the same pivot selection, swap and elimination sequence as the
/// coordinator, with every step's rows handled by one range.
pub fn eliminate_serial(matrix: &mut AugmentedMatrix) -> Result<()> {
    let n = matrix.n();
    for k in 0..n {
        let pivot = select_pivot(matrix, k)?;
        matrix.swap_rows(k, pivot.row)?;
        if k + 1 == n {
            break;
        }
        let (pivot_row, below) = matrix.split_for_step(k)?;
        eliminate_rows(0, k, RowRange::new(k + 1, n), pivot_row.view(), below)?;
    }
    Ok(())
}

/// Run [`eliminate_serial`] on a copy of `matrix` and time it
///
/// The returned duration covers the same phase as
/// [`SolveReport::elapsed`](crate::report::SolveReport::elapsed), so the two
/// can be compared directly.
pub fn eliminate_serial_timed(matrix: &AugmentedMatrix) -> Result<(AugmentedMatrix, Duration)> {
    let mut reference = matrix.clone();
    let start = Instant::now();
    eliminate_serial(&mut reference)?;
    Ok((reference, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    #[test]
    fn test_eliminates_column_and_updates_rhs() {
        let pivot = array![2.0, 1.0, -1.0, 8.0];
        let mut rows = array![[-3.0, -1.0, 2.0, -11.0], [-2.0, 1.0, 2.0, -3.0]];

        eliminate_rows(0, 0, RowRange::new(1, 3), pivot.view(), rows.view_mut()).unwrap();

        assert_eq!(rows[[0, 0]], 0.0);
        assert_eq!(rows[[1, 0]], 0.0);
        assert_abs_diff_eq!(rows[[0, 1]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rows[[0, 2]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rows[[0, 3]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rows[[1, 1]], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rows[[1, 3]], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_leaves_columns_before_step_untouched() {
        let pivot = array![0.0, 4.0, 1.0, 2.0];
        let mut rows = array![[7.0, 2.0, 3.0, 1.0]];

        eliminate_rows(0, 1, RowRange::new(2, 3), pivot.view(), rows.view_mut()).unwrap();

        assert_eq!(rows[[0, 0]], 7.0);
        assert_eq!(rows[[0, 1]], 0.0);
        assert_abs_diff_eq!(rows[[0, 2]], 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rows[[0, 3]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_range_touching_pivot() {
        let pivot = array![1.0, 1.0, 1.0];
        let mut rows = array![[1.0, 1.0, 1.0]];
        let err =
            eliminate_rows(3, 0, RowRange::new(0, 1), pivot.view(), rows.view_mut()).unwrap_err();
        assert!(matches!(
            err,
            GaussError::WorkerFailure {
                worker: 3,
                start: 0,
                end: 1,
                ..
            }
        ));
        assert_eq!(rows, array![[1.0, 1.0, 1.0]]);
    }

    #[test]
    fn test_rejects_mismatched_block() {
        let pivot = array![1.0, 1.0, 1.0];
        let mut rows = Array2::<f64>::ones((2, 3));
        let err =
            eliminate_rows(0, 0, RowRange::new(1, 4), pivot.view(), rows.view_mut()).unwrap_err();
        assert!(err.is_worker_failure());
    }

    #[test]
    fn test_rejects_zero_pivot() {
        let pivot = array![0.0, 1.0, 1.0];
        let mut rows = array![[1.0, 1.0, 1.0]];
        let err =
            eliminate_rows(0, 0, RowRange::new(1, 2), pivot.view(), rows.view_mut()).unwrap_err();
        assert!(err.is_worker_failure());
    }

    #[test]
    fn test_serial_reaches_upper_triangular() {
        let mut m = AugmentedMatrix::from_array(array![
            [2.0, 1.0, -1.0, 8.0],
            [-3.0, -1.0, 2.0, -11.0],
            [-2.0, 1.0, 2.0, -3.0],
        ])
        .unwrap();
        eliminate_serial(&mut m).unwrap();
        assert!(m.is_upper_triangular());
        // Row 1 (-3) is the first pivot.
        assert_eq!(m.get(0, 0).unwrap(), -3.0);
    }

    #[test]
    fn test_serial_singular() {
        let mut m =
            AugmentedMatrix::from_array(array![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0]]).unwrap();
        assert!(eliminate_serial(&mut m).unwrap_err().is_singular());
    }

    #[test]
    fn test_serial_timed_matches_untimed() {
        let original = AugmentedMatrix::from_array(array![
            [2.0, 1.0, -1.0, 8.0],
            [-3.0, -1.0, 2.0, -11.0],
            [-2.0, 1.0, 2.0, -3.0],
        ])
        .unwrap();
        let mut expected = original.clone();
        eliminate_serial(&mut expected).unwrap();

        let (reference, _elapsed) = eliminate_serial_timed(&original).unwrap();
        assert_eq!(reference, expected);
        assert!(!original.is_upper_triangular());

        let singular =
            AugmentedMatrix::from_array(array![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0]]).unwrap();
        assert!(eliminate_serial_timed(&singular).unwrap_err().is_singular());
    }
}
