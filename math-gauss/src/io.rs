//! Plain-text matrix format
//!
//! The first non-blank line holds `n`; each of the next `n` non-blank lines
//! holds `n + 1` whitespace-separated numbers, the last one being the
//! right-hand side of that equation.
//!
//! ```text
//! 3
//! 2 1 -1 8
//! -3 -1 2 -11
//! -2 1 2 -3
//! ```

use crate::error::{GaussError, Result};
use crate::matrix::AugmentedMatrix;
use ndarray::Array2;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

/// Parse a matrix from the text format
pub fn parse_matrix(text: &str) -> Result<AugmentedMatrix> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_line, header) = lines.next().ok_or_else(|| GaussError::Parse {
        line: 1,
        message: "missing matrix size".to_string(),
    })?;
    let n: usize = header.parse().map_err(|_| GaussError::Parse {
        line: header_line,
        message: format!("invalid matrix size '{}'", header),
    })?;
    if n == 0 {
        return Err(GaussError::Parse {
            line: header_line,
            message: "matrix size must be at least 1".to_string(),
        });
    }

    let mut data = Array2::<f64>::zeros((n, n + 1));
    for row in 0..n {
        let (line_no, line) = lines.next().ok_or_else(|| GaussError::Parse {
            line: header_line + row + 1,
            message: format!("expected {} rows, found {}", n, row),
        })?;
        let mut count = 0;
        for (col, token) in line.split_whitespace().enumerate() {
            if col > n {
                count = col + 1;
                continue;
            }
            data[[row, col]] = token.parse().map_err(|_| GaussError::Parse {
                line: line_no,
                message: format!("invalid number '{}'", token),
            })?;
            count = col + 1;
        }
        if count != n + 1 {
            return Err(GaussError::Parse {
                line: line_no,
                message: format!("expected {} values, found {}", n + 1, count),
            });
        }
    }

    if let Some((line_no, _)) = lines.next() {
        return Err(GaussError::Parse {
            line: line_no,
            message: "unexpected data after last row".to_string(),
        });
    }

    AugmentedMatrix::from_array(data)
}

/// Read and parse a matrix file
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<AugmentedMatrix> {
    let text = fs::read_to_string(path)?;
    parse_matrix(&text)
}

/// Render the matrix rows, entries separated by spaces, one row per line
pub fn format_matrix(matrix: &AugmentedMatrix) -> String {
    let mut out = String::new();
    for row in matrix.as_array().outer_iter() {
        let mut first = true;
        for v in row.iter() {
            if !first {
                out.push(' ');
            }
            first = false;
            let _ = write!(out, "{}", v);
        }
        out.push('\n');
    }
    out
}

/// Write a matrix file that [`read_matrix`] can load back
pub fn write_matrix<P: AsRef<Path>>(path: P, matrix: &AugmentedMatrix) -> Result<()> {
    let mut out = format!("{}\n", matrix.n());
    out.push_str(&format_matrix(matrix));
    fs::write(path, out)?;
    Ok(())
}
