//! Augmented matrix storage
//!
//! [`AugmentedMatrix`] owns the `n × (n+1)` grid `[A | b]` for the duration of
//! a solve. Elimination workers never hold the matrix itself: for each step
//! the coordinator calls [`AugmentedMatrix::split_for_step`], which lends out
//! the pivot row and the rows below it as separate views that expire with the
//! step.

use crate::error::{GaussError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis, s};

/// Dense augmented matrix `[A | b]` with `n` rows and `n + 1` columns
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedMatrix {
    data: Array2<f64>,
}

impl AugmentedMatrix {
    /// Wrap an existing array, checking that it is `n × (n+1)` with `n > 0`
    ///
    /// NaN and infinite entries are rejected with [`GaussError::NonFinite`].
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows == 0 || cols != rows + 1 {
            return Err(GaussError::Shape { rows, cols });
        }
        if let Some(((row, col), &value)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(GaussError::NonFinite { row, col, value });
        }
        // Row views handed to workers assume contiguous rows.
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self { data })
    }

    /// Build from a list of rows
    ///
    /// Ragged input reports the length of the first offending row as `cols`.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(GaussError::Shape { rows: 0, cols: 0 });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != n + 1) {
            return Err(GaussError::Shape {
                rows: n,
                cols: bad.len(),
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let data = Array2::from_shape_vec((n, n + 1), flat).map_err(|_| GaussError::Shape {
            rows: n,
            cols: n + 1,
        })?;
        Self::from_array(data)
    }

    /// Wrap an array without any checks, for building states that
    /// elimination could reach but no constructor accepts
    #[cfg(test)]
    pub(crate) fn from_unchecked(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Number of equations
    pub fn n(&self) -> usize {
        self.data.nrows()
    }

    /// Number of rows (same as [`n`](Self::n))
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns, always `n + 1`
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Borrow the underlying array
    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    /// Consume the matrix and return the underlying array
    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// View of row `i` across all `n + 1` columns
    pub fn row(&self, i: usize) -> Result<ArrayView1<'_, f64>> {
        self.check(i, 0)?;
        Ok(self.data.row(i))
    }

    /// The `n × n` coefficient block
    pub fn coefficients(&self) -> ArrayView2<'_, f64> {
        let n = self.n();
        self.data.slice(s![.., ..n])
    }

    /// The right-hand-side column
    pub fn rhs(&self) -> ArrayView1<'_, f64> {
        self.data.column(self.n())
    }

    /// Bounds-checked read
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check(row, col)?;
        Ok(self.data[[row, col]])
    }

    /// Bounds-checked write; non-finite values are rejected
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check(row, col)?;
        if !value.is_finite() {
            return Err(GaussError::NonFinite { row, col, value });
        }
        self.data[[row, col]] = value;
        Ok(())
    }

    /// Exchange rows `i` and `j` across every column, including the right-hand side
    pub fn swap_rows(&mut self, i: usize, j: usize) -> Result<()> {
        self.check(i, 0)?;
        self.check(j, 0)?;
        if i == j {
            return Ok(());
        }
        for col in 0..self.cols() {
            self.data.swap([i, col], [j, col]);
        }
        Ok(())
    }

    /// Lend out row `k` and rows `k+1..n` as disjoint views for one elimination step
    ///
    /// The first view is the pivot row; the second holds every row below it.
    /// Both borrow `self` mutably, so no row swap or other access can happen
    /// until they are dropped.
    pub(crate) fn split_for_step(
        &mut self,
        k: usize,
    ) -> Result<(ArrayViewMut1<'_, f64>, ArrayViewMut2<'_, f64>)> {
        self.check(k, k)?;
        let (head, below) = self.data.view_mut().split_at(Axis(0), k + 1);
        let pivot_row = head.index_axis_move(Axis(0), k);
        Ok((pivot_row, below))
    }

    /// `true` if every entry strictly below the diagonal is exactly zero
    pub fn is_upper_triangular(&self) -> bool {
        self.data
            .indexed_iter()
            .filter(|((r, c), _)| r > c)
            .all(|(_, &v)| v == 0.0)
    }

    fn check(&self, row: usize, col: usize) -> Result<()> {
        let (rows, cols) = self.data.dim();
        if row >= rows || col >= cols {
            return Err(GaussError::OutOfBounds {
                row,
                col,
                rows,
                cols,
            });
        }
        Ok(())
    }
}

impl TryFrom<Array2<f64>> for AugmentedMatrix {
    type Error = GaussError;

    fn try_from(data: Array2<f64>) -> Result<Self> {
        Self::from_array(data)
    }
}
