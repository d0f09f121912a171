//! Row ranges and their distribution across workers

use std::ops::Range;

/// Half-open interval `[start, end)` of row indices owned by one worker for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    /// First row
    pub start: usize,
    /// One past the last row
    pub end: usize,
}

impl RowRange {
    /// Create a new range
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of rows in the range
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// `true` if the range holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if `row` lies in the range
    pub fn contains(&self, row: usize) -> bool {
        (self.start..self.end).contains(&row)
    }

    /// Iterate over the row indices
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for RowRange {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// Split rows `k+1..n` into at most `workers` contiguous ranges
///
/// Each range gets `(n-1-k) / p` rows, where `p` is the effective worker
/// count, and the remainder goes to the last range. `p` is reduced so that no
/// range is empty and no range holds fewer than `min_rows` rows (except when
/// fewer than `min_rows` rows remain at all, in which case a single range
/// takes them). Returns an empty vector when no rows remain below `k`.
pub fn partition_rows(k: usize, n: usize, workers: usize, min_rows: usize) -> Vec<RowRange> {
    let first = k + 1;
    if first >= n {
        return Vec::new();
    }
    let remaining = n - first;
    let p = workers
        .min(remaining / min_rows.max(1))
        .max(1);
    let base = remaining / p;

    (0..p)
        .map(|i| {
            let start = first + i * base;
            let end = if i + 1 == p { n } else { start + base };
            RowRange::new(start, end)
        })
        .collect()
}
