//! Error types for the Gaussian elimination solver.
//!
//! Every failure is fatal for the current solve: the matrix is deterministic,
//! so a retry would reproduce the same error. Nothing here is recovered
//! internally, all variants propagate to the caller of `solve`.

use thiserror::Error;

/// Errors that can occur while building, eliminating or solving a system.
#[derive(Debug, Error)]
pub enum GaussError {
    /// The grid is not `n × (n+1)`.
    #[error("augmented matrix must be n x (n+1), got {rows} x {cols}")]
    Shape {
        /// Number of rows supplied
        rows: usize,
        /// Number of columns supplied (first offending row for ragged input)
        cols: usize,
    },

    /// A row or column index is outside the matrix.
    #[error("index ({row}, {col}) out of bounds for {rows} x {cols} matrix")]
    OutOfBounds {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Row count of the matrix
        rows: usize,
        /// Column count of the matrix
        cols: usize,
    },

    /// An entry is NaN or infinite.
    #[error("entry ({row}, {col}) is not finite: {value}")]
    NonFinite {
        /// Row of the entry
        row: usize,
        /// Column of the entry
        col: usize,
        /// The offending value
        value: f64,
    },

    /// Zero pivot column during elimination, or zero diagonal during back substitution.
    #[error("matrix is singular: zero pivot at step {step}")]
    Singular {
        /// Elimination step (or row, for back substitution) where it was detected
        step: usize,
    },

    /// An elimination task rejected its row range or terminated abnormally.
    #[error("worker {worker} failed on rows [{start}, {end}): {reason}")]
    WorkerFailure {
        /// Index of the worker within its step
        worker: usize,
        /// First row of the assigned range
        start: usize,
        /// One past the last row of the assigned range
        end: usize,
        /// What went wrong
        reason: String,
    },

    /// Solver configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Text input could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for solver operations.
pub type Result<T> = std::result::Result<T, GaussError>;

impl GaussError {
    /// Returns `true` for shape, bounds and non-finite input errors.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            GaussError::Shape { .. } | GaussError::OutOfBounds { .. } | GaussError::NonFinite { .. }
        )
    }

    /// Returns `true` if the system has no unique solution.
    pub fn is_singular(&self) -> bool {
        matches!(self, GaussError::Singular { .. })
    }

    /// Returns `true` if an elimination task failed.
    pub fn is_worker_failure(&self) -> bool {
        matches!(self, GaussError::WorkerFailure { .. })
    }
}
