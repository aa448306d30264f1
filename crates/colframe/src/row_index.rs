use std::ops::Range;
use std::sync::Arc;

/// Logical-to-physical row mapping of a [`crate::Table`].
///
/// Entry `j` is the physical position (into the column arrays) of logical row
/// `j`. Positions may repeat and need not be sorted. Slicing shares the
/// underlying buffer.
#[derive(Clone, Debug)]
pub struct RowIndex {
    positions: Arc<[usize]>,
    start: usize,
    end: usize,
}

impl RowIndex {
    /// The ascending sequence `0..rows`.
    pub fn identity(rows: usize) -> Self {
        Self::from_vec((0..rows).collect())
    }

    pub(crate) fn from_vec(positions: Vec<usize>) -> Self {
        let end = positions.len();
        Self {
            positions: positions.into(),
            start: 0,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.positions[self.start..self.end]
    }

    /// Physical position of logical row `row`.
    pub fn get(&self, row: usize) -> Option<usize> {
        self.as_slice().get(row).copied()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, usize>> {
        self.as_slice().iter().copied()
    }

    /// Sub-range of logical rows, sharing the buffer.
    pub(crate) fn slice(&self, rows: Range<usize>) -> Self {
        debug_assert!(rows.start <= rows.end && rows.end <= self.len());
        Self {
            positions: Arc::clone(&self.positions),
            start: self.start + rows.start,
            end: self.start + rows.end,
        }
    }

    /// Physical positions of the logical rows `rows`, in that order.
    pub(crate) fn compose(&self, rows: &[usize]) -> Vec<usize> {
        let positions = self.as_slice();
        rows.iter().map(|&r| positions[r]).collect()
    }

    /// Whether the index is exactly `0..allocated`.
    pub(crate) fn is_identity_over(&self, allocated: usize) -> bool {
        self.len() == allocated && self.iter().enumerate().all(|(i, p)| i == p)
    }

    /// The physical range covered when the positions are consecutive and
    /// ascending.
    pub fn contiguous_range(&self) -> Option<Range<usize>> {
        let positions = self.as_slice();
        let first = *positions.first()?;
        positions
            .iter()
            .enumerate()
            .all(|(i, &p)| p == first + i)
            .then(|| first..first + positions.len())
    }
}

impl PartialEq for RowIndex {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for RowIndex {}
