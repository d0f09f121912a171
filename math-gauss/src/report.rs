//! Solve results and progress reporting

use crate::matrix::AugmentedMatrix;
use crate::verify::{check_solution, max_residual};
use ndarray::Array1;
use std::time::Duration;

/// Outcome of a successful solve
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// The input system, untouched
    pub original: AugmentedMatrix,
    /// Upper triangular form after elimination
    pub triangular: AugmentedMatrix,
    /// Solution vector
    pub solution: Array1<f64>,
    /// Wall-clock time of the elimination phase
    pub elapsed: Duration,
    /// Worker count used per step
    pub workers: usize,
}

impl SolveReport {
    /// Size of the system
    pub fn n(&self) -> usize {
        self.solution.len()
    }

    /// Elapsed elimination time in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Verify the solution against the original system
    pub fn is_valid(&self, tolerance: f64) -> bool {
        check_solution(&self.original, &self.solution, tolerance)
    }

    /// Largest absolute row residual of the solution
    pub fn max_residual(&self) -> f64 {
        max_residual(&self.original, &self.solution).unwrap_or(f64::NAN)
    }
}

/// Receives intermediate matrices and final results from the coordinator
///
/// Both methods default to doing nothing. `on_step` is only called when the
/// solver runs with `verbose` enabled.
pub trait Reporter {
    /// Called after elimination step `k` has completed
    fn on_step(&mut self, _k: usize, _matrix: &AugmentedMatrix) {}

    /// Called once the solution has been computed
    fn on_solved(&mut self, _report: &SolveReport) {}
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Reporter that forwards everything to the `log` facade
///
/// Intermediate matrices go to `debug`, the summary to `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn on_step(&mut self, k: usize, matrix: &AugmentedMatrix) {
        log::debug!("after step {}:\n{}", k, crate::io::format_matrix(matrix));
    }

    fn on_solved(&mut self, report: &SolveReport) {
        log::info!(
            "solved {}x{} system with {} workers in {:.3} ms (max residual {:.3e})",
            report.n(),
            report.n() + 1,
            report.workers,
            report.elapsed_ms(),
            report.max_residual()
        );
    }
}

/// Reporter that keeps a copy of every intermediate matrix
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    /// `(step, matrix)` snapshots in order
    pub steps: Vec<(usize, AugmentedMatrix)>,
    /// Number of completed solves seen
    pub solved: usize,
}

impl Reporter for RecordingReporter {
    fn on_step(&mut self, k: usize, matrix: &AugmentedMatrix) {
        self.steps.push((k, matrix.clone()));
    }

    fn on_solved(&mut self, _report: &SolveReport) {
        self.solved += 1;
    }
}
