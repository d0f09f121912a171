//! Parallel elimination driver
//!
//! The [`Coordinator`] owns a rayon thread pool with one thread per worker and
//! drives the pivot steps `k = 0..n`. Each step has a serial phase (pivot
//! search and row swap, with exclusive access to the matrix) followed by a
//! parallel phase: rows `k+1..n` are split into contiguous blocks, every block
//! is eliminated by its own task, and the step ends only when all tasks have
//! returned. The blocks are disjoint mutable views borrowed from the matrix
//! for the duration of the step, so no locking is needed.
//!
//! # Example
//!
//! ```
//! use math_audio_gauss::{AugmentedMatrix, GaussConfig, solve};
//! use ndarray::array;
//!
//! let m = AugmentedMatrix::from_array(array![
//!     [2.0, 1.0, -1.0, 8.0],
//!     [-3.0, -1.0, 2.0, -11.0],
//!     [-2.0, 1.0, 2.0, -3.0],
//! ])?;
//! let report = solve(m, &GaussConfig::default().with_workers(2))?;
//! assert!((report.solution[0] - 2.0).abs() < 1e-9);
//! # Ok::<(), math_audio_gauss::GaussError>(())
//! ```

use crate::back_substitution::back_substitute;
use crate::config::GaussConfig;
use crate::elimination::eliminate_rows;
use crate::error::{GaussError, Result};
use crate::matrix::AugmentedMatrix;
use crate::partition::{RowRange, partition_rows};
use crate::pivot::select_pivot;
use crate::report::{LogReporter, NullReporter, Reporter, SolveReport};
use ndarray::{Array1, Array2, ArrayViewMut2, Axis, concatenate};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Drives barrier-synchronized elimination rounds on a fixed pool of workers
pub struct Coordinator {
    config: GaussConfig,
    workers: usize,
    pool: ThreadPool,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Validate the configuration and build a pool with one thread per worker
    pub fn new(config: &GaussConfig) -> Result<Self> {
        config.validate()?;
        let workers = config.resolved_workers();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gauss-worker-{}", i))
            .build()
            .map_err(|e| GaussError::InvalidConfig(format!("thread pool: {}", e)))?;
        Ok(Self {
            config: config.clone(),
            workers,
            pool,
        })
    }

    /// Number of workers per step
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The configuration this coordinator was built with
    pub fn config(&self) -> &GaussConfig {
        &self.config
    }

    /// Row ranges dispatched for step `k` of an `n`-row system
    pub fn step_ranges(&self, k: usize, n: usize) -> Vec<RowRange> {
        partition_rows(k, n, self.workers, self.config.min_rows_per_worker)
    }

    /// Reduce `matrix` to upper triangular form in place
    ///
    /// On error the matrix is left partially eliminated and must not be used.
    pub fn triangularize(
        &self,
        matrix: &mut AugmentedMatrix,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        let n = matrix.n();
        for k in 0..n {
            let pivot = select_pivot(matrix, k)?;
            matrix.swap_rows(k, pivot.row)?;

            let ranges = self.step_ranges(k, n);
            log::debug!(
                "step {}: pivot row {} ({:.6e}), {} ranges",
                k,
                pivot.row,
                pivot.value,
                ranges.len()
            );
            self.eliminate_step(matrix, k, &ranges)?;

            if self.config.verbose {
                reporter.on_step(k, matrix);
            }
        }
        Ok(())
    }

    /// Run one parallel elimination round for step `k` over `ranges`
    ///
    /// The ranges must be ordered, contiguous and cover rows `k+1..n` exactly;
    /// this is checked before any task is dispatched. Each range is handed to
    /// its own task and the call returns once every task has finished. The
    /// first failing range, in range order, is returned as the error.
    pub fn eliminate_step(
        &self,
        matrix: &mut AugmentedMatrix,
        k: usize,
        ranges: &[RowRange],
    ) -> Result<()> {
        let n = matrix.n();
        check_coverage(k, n, ranges)?;
        if ranges.is_empty() {
            return Ok(());
        }

        let (pivot_row, mut below) = matrix.split_for_step(k)?;
        let pivot_row = pivot_row.view();

        let mut tasks: Vec<(usize, RowRange, ArrayViewMut2<'_, f64>)> =
            Vec::with_capacity(ranges.len());
        for (worker, &range) in ranges.iter().enumerate() {
            let (block, rest) = below.split_at(Axis(0), range.len());
            tasks.push((worker, range, block));
            below = rest;
        }

        let results: Vec<Result<()>> = self.pool.install(|| {
            tasks
                .into_par_iter()
                .with_max_len(1)
                .map(|(worker, range, block)| {
                    run_worker(worker, range, || {
                        eliminate_rows(worker, k, range, pivot_row, block)
                    })
                })
                .collect()
        });

        for result in results {
            if let Err(e) = result {
                log::error!("aborting elimination at step {}: {}", k, e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Triangularize, time the elimination, then back-substitute
    pub fn solve(
        &self,
        matrix: AugmentedMatrix,
        reporter: &mut dyn Reporter,
    ) -> Result<SolveReport> {
        let original = matrix.clone();
        let mut triangular = matrix;

        let start = Instant::now();
        self.triangularize(&mut triangular, reporter)?;
        let elapsed = start.elapsed();

        let solution = back_substitute(&triangular)?;
        let report = SolveReport {
            original,
            triangular,
            solution,
            elapsed,
            workers: self.workers,
        };
        reporter.on_solved(&report);
        Ok(report)
    }
}

fn check_coverage(k: usize, n: usize, ranges: &[RowRange]) -> Result<()> {
    let mut next = k + 1;
    for (worker, range) in ranges.iter().enumerate() {
        if range.start != next || range.is_empty() || range.end > n {
            return Err(GaussError::WorkerFailure {
                worker,
                start: range.start,
                end: range.end,
                reason: format!(
                    "expected a non-empty range starting at {} within {} rows",
                    next, n
                ),
            });
        }
        next = range.end;
    }
    if next < n {
        let (worker, start) = match ranges.len() {
            0 => (0, k + 1),
            len => (len - 1, ranges[len - 1].start),
        };
        return Err(GaussError::WorkerFailure {
            worker,
            start,
            end: next,
            reason: format!("rows {}..{} are not assigned to any worker", next, n),
        });
    }
    Ok(())
}

/// Run one worker task, turning a panic into [`GaussError::WorkerFailure`]
fn run_worker<F>(worker: usize, range: RowRange, task: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|payload| {
        Err(GaussError::WorkerFailure {
            worker,
            start: range.start,
            end: range.end,
            reason: format!("panicked: {}", panic_message(payload.as_ref())),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Triangularize `matrix` in place with a fresh coordinator
pub fn triangularize(matrix: &mut AugmentedMatrix, config: &GaussConfig) -> Result<()> {
    Coordinator::new(config)?.triangularize(matrix, &mut NullReporter)
}

/// Solve the augmented system with a fresh coordinator, reporting through `log`
pub fn solve(matrix: AugmentedMatrix, config: &GaussConfig) -> Result<SolveReport> {
    Coordinator::new(config)?.solve(matrix, &mut LogReporter)
}

/// Solve `a · x = b` for a square `a`
pub fn gauss_solve(a: &Array2<f64>, b: &Array1<f64>, config: &GaussConfig) -> Result<Array1<f64>> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(GaussError::Shape { rows, cols });
    }
    if b.len() != rows {
        return Err(GaussError::Shape {
            rows: b.len(),
            cols: cols + 1,
        });
    }
    let augmented = concatenate(Axis(1), &[a.view(), b.view().insert_axis(Axis(1))])
        .map_err(|_| GaussError::Shape {
            rows,
            cols: cols + 1,
        })?;
    let report = solve(AugmentedMatrix::from_array(augmented)?, config)?;
    Ok(report.solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elimination::eliminate_serial;
    use crate::generate::seeded_matrix;
    use crate::report::RecordingReporter;
    use crate::verify::{DEFAULT_TOLERANCE, check_solution};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn textbook() -> AugmentedMatrix {
        AugmentedMatrix::from_array(array![
            [2.0, 1.0, -1.0, 8.0],
            [-3.0, -1.0, 2.0, -11.0],
            [-2.0, 1.0, 2.0, -3.0],
        ])
        .unwrap()
    }

    fn coordinator(workers: usize) -> Coordinator {
        Coordinator::new(&GaussConfig::default().with_workers(workers)).unwrap()
    }

    #[test]
    fn test_textbook_system_for_each_worker_count() {
        for workers in [1, 2, 4] {
            let report = coordinator(workers)
                .solve(textbook(), &mut NullReporter)
                .unwrap();
            assert_abs_diff_eq!(report.solution[0], 2.0, epsilon = 1e-9);
            assert_abs_diff_eq!(report.solution[1], 3.0, epsilon = 1e-9);
            assert_abs_diff_eq!(report.solution[2], -1.0, epsilon = 1e-9);
            assert!(report.triangular.is_upper_triangular());
            assert!(report.is_valid(DEFAULT_TOLERANCE));
            assert_eq!(report.original, textbook());
        }
    }

    #[test]
    fn test_matches_serial_reference_bitwise() {
        let original = seeded_matrix(40, 10, 11).unwrap();
        let mut serial = original.clone();
        eliminate_serial(&mut serial).unwrap();

        for workers in [1, 3, 8] {
            let mut parallel = original.clone();
            coordinator(workers)
                .triangularize(&mut parallel, &mut NullReporter)
                .unwrap();
            assert_eq!(parallel, serial);
        }
    }

    #[test]
    fn test_singular_column() {
        let m = AugmentedMatrix::from_array(array![[0.0, 1.0, 5.0], [0.0, 2.0, 8.0]]).unwrap();
        let err = coordinator(2).solve(m, &mut NullReporter).unwrap_err();
        assert!(matches!(err, GaussError::Singular { step: 0 }));
    }

    #[test]
    fn test_singular_after_elimination() {
        let m = AugmentedMatrix::from_array(array![
            [1.0, 2.0, 3.0, 1.0],
            [2.0, 4.0, 6.0, 2.0],
            [1.0, 0.0, 1.0, 0.0],
        ])
        .unwrap();
        let err = coordinator(2).solve(m, &mut NullReporter).unwrap_err();
        assert!(err.is_singular());
    }

    #[test]
    fn test_verbose_reports_every_step() {
        let c = Coordinator::new(&GaussConfig::default().with_workers(2).with_verbose(true))
            .unwrap();
        let mut rec = RecordingReporter::default();
        c.solve(textbook(), &mut rec).unwrap();
        assert_eq!(
            rec.steps.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(rec.solved, 1);
        // Column 0 is cleared below the diagonal after the first step.
        let after_first = &rec.steps[0].1;
        assert_eq!(after_first.get(1, 0).unwrap(), 0.0);
        assert_eq!(after_first.get(2, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_quiet_reports_only_result() {
        let mut rec = RecordingReporter::default();
        coordinator(2).solve(textbook(), &mut rec).unwrap();
        assert!(rec.steps.is_empty());
        assert_eq!(rec.solved, 1);
    }

    #[test]
    fn test_gap_in_ranges_is_worker_failure() {
        let mut m = seeded_matrix(6, 10, 3).unwrap();
        let c = coordinator(2);
        let ranges = [RowRange::new(1, 3), RowRange::new(4, 6)];
        let err = c.eliminate_step(&mut m, 0, &ranges).unwrap_err();
        assert!(matches!(
            err,
            GaussError::WorkerFailure {
                worker: 1,
                start: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_tail_is_worker_failure() {
        let mut m = seeded_matrix(6, 10, 3).unwrap();
        let before = m.clone();
        let err = coordinator(2)
            .eliminate_step(&mut m, 0, &[RowRange::new(1, 4)])
            .unwrap_err();
        assert!(err.is_worker_failure());
        assert_eq!(m, before);
    }

    #[test]
    fn test_range_overlapping_pivot_is_worker_failure() {
        let mut m = seeded_matrix(4, 10, 5).unwrap();
        let err = coordinator(1)
            .eliminate_step(&mut m, 1, &[RowRange::new(1, 4)])
            .unwrap_err();
        assert!(err.is_worker_failure());
    }

    #[test]
    fn test_step_ranges_follow_partition() {
        let c = coordinator(4);
        assert_eq!(c.step_ranges(0, 10).len(), 4);
        assert_eq!(c.step_ranges(7, 10).len(), 2);
        assert!(c.step_ranges(9, 10).is_empty());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = Coordinator::new(&GaussConfig::default().with_workers(0)).unwrap_err();
        assert!(matches!(err, GaussError::InvalidConfig(_)));
    }

    #[test]
    fn test_gauss_solve() {
        let a = array![[4.0_f64, 1.0], [1.0, 3.0]];
        let b = array![1.0_f64, 2.0];
        let x = gauss_solve(&a, &b, &GaussConfig::default().with_workers(2)).unwrap();
        let ax = a.dot(&x);
        assert_abs_diff_eq!(ax[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ax[1], 2.0, epsilon = 1e-12);

        let bad = gauss_solve(&a, &array![1.0], &GaussConfig::default()).unwrap_err();
        assert!(bad.is_shape_error());
    }

    #[test]
    fn test_random_system_verifies() {
        let m = seeded_matrix(32, 10, 42).unwrap();
        let report = coordinator(4).solve(m.clone(), &mut NullReporter).unwrap();
        assert!(check_solution(&m, &report.solution, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_worker_panic_with_str_payload() {
        let err = run_worker(2, RowRange::new(3, 5), || -> Result<()> {
            panic!("row block corrupted")
        })
        .unwrap_err();
        match err {
            GaussError::WorkerFailure {
                worker,
                start,
                end,
                reason,
            } => {
                assert_eq!((worker, start, end), (2, 3, 5));
                assert!(reason.contains("row block corrupted"), "{}", reason);
            }
            other => panic!("expected WorkerFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_worker_panic_with_string_payload() {
        let row = 4;
        let err = run_worker(0, RowRange::new(1, 7), || -> Result<()> {
            panic!("row {} is corrupted", row)
        })
        .unwrap_err();
        match err {
            GaussError::WorkerFailure {
                worker,
                start,
                end,
                reason,
            } => {
                assert_eq!((worker, start, end), (0, 1, 7));
                assert!(reason.contains("row 4 is corrupted"), "{}", reason);
            }
            other => panic!("expected WorkerFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_worker_result_passes_through() {
        assert!(run_worker(0, RowRange::new(1, 2), || Ok(())).is_ok());
        let err = run_worker(1, RowRange::new(2, 3), || Err(GaussError::Singular { step: 1 }))
            .unwrap_err();
        assert!(err.is_singular());
    }
}
