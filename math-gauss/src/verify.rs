//! Solution verification against the original system

use crate::matrix::AugmentedMatrix;
use ndarray::Array1;

/// Absolute tolerance used by the test harness
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Check that `A · solution ≈ b` for every row of the original matrix
///
/// A row passes when `|Σ a[x][y] * solution[y] - b[x]| < tolerance`.
/// A solution of the wrong length never passes.
pub fn check_solution(original: &AugmentedMatrix, solution: &Array1<f64>, tolerance: f64) -> bool {
    match max_residual(original, solution) {
        Some(residual) => residual < tolerance,
        None => false,
    }
}

/// Largest absolute row residual `|A · solution - b|`, or `None` on length mismatch
///
/// NaN residuals propagate, so a NaN solution never verifies.
pub fn max_residual(original: &AugmentedMatrix, solution: &Array1<f64>) -> Option<f64> {
    if solution.len() != original.n() {
        return None;
    }
    let ax = original.coefficients().dot(solution);
    let residual = ax
        .iter()
        .zip(original.rhs().iter())
        .map(|(lhs, rhs)| (lhs - rhs).abs())
        .fold(0.0_f64, |acc, r| {
            if acc.is_nan() || r.is_nan() {
                f64::NAN
            } else {
                acc.max(r)
            }
        });
    Some(residual)
}
