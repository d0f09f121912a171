//! Parallel Gaussian elimination for dense linear systems
//!
//! This crate solves `Ax = b` for a dense square `A` by reducing the augmented
//! matrix `[A | b]` to upper triangular form with partial pivoting, then
//! recovering `x` by back substitution.
//!
//! # Features
//!
//! - **Parallel elimination**: each pivot step splits the rows below the pivot
//!   into contiguous blocks that are eliminated concurrently on a rayon pool
//! - **Partial pivoting**: largest-magnitude pivot, earliest row on ties
//! - **Deterministic**: results are bitwise identical for any worker count
//! - **Harness helpers**: text format reader/writer, seeded random matrices,
//!   solution checking
//!
//! # Example
//!
//! ```ignore
//! use math_audio_gauss::{GaussConfig, check_solution, seeded_matrix, solve};
//!
//! let matrix = seeded_matrix(64, 10, 42)?;
//! let config = GaussConfig::default().with_workers(8);
//! let report = solve(matrix, &config)?;
//! assert!(check_solution(&report.original, &report.solution, 0.1));
//! ```

pub mod back_substitution;
pub mod config;
pub mod coordinator;
pub mod elimination;
pub mod error;
pub mod generate;
pub mod io;
pub mod matrix;
pub mod partition;
pub mod pivot;
pub mod report;
pub mod verify;

// Re-export main types
pub use config::{GaussConfig, HarnessConfig};
pub use error::{GaussError, Result};
pub use matrix::AugmentedMatrix;
pub use partition::{RowRange, partition_rows};
pub use pivot::{Pivot, select_pivot};
pub use report::{LogReporter, NullReporter, RecordingReporter, Reporter, SolveReport};

// Re-export solver entry points
pub use back_substitution::back_substitute;
pub use coordinator::{Coordinator, gauss_solve, solve, triangularize};
pub use elimination::{eliminate_rows, eliminate_serial, eliminate_serial_timed};

// Re-export harness helpers
pub use generate::{random_matrix, seeded_matrix};
pub use io::{format_matrix, parse_matrix, read_matrix, write_matrix};
pub use verify::{DEFAULT_TOLERANCE, check_solution, max_residual};
