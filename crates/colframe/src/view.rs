//! The view algebra: every operation here returns a new [`Table`] aliasing
//! the receiver's column arrays through a derived row index. Parameters are
//! validated before anything is built, so a failed call leaves the receiver
//! untouched.

use colframe_work::GroupIndexer;
use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::header::ColumnHeader;
use crate::raw::ColumnMap;
use crate::row_index::RowIndex;
use crate::table::Table;

/// Ordering source for `sorted_view`/`top_view`.
enum SortColumn<'a> {
    Float(&'a [f64]),
    Int(&'a [i64]),
    Bool(&'a [bool]),
}

impl SortColumn<'_> {
    /// Compares two physical rows. NaN sorts after every number; the missing
    /// integer is compared as `-1`.
    fn compare(&self, a: usize, b: usize) -> Ordering {
        match self {
            SortColumn::Float(v) => OrderedFloat(v[a]).cmp(&OrderedFloat(v[b])),
            SortColumn::Int(v) => v[a].cmp(&v[b]),
            SortColumn::Bool(v) => v[a].cmp(&v[b]),
        }
    }
}

impl Table {
    /// Selects logical rows `indices[0], indices[1], ...`. Rows may repeat,
    /// so the result may have more rows than the receiver.
    pub fn index_view(&self, indices: &[usize]) -> FrameResult<Table> {
        let len = self.num_rows();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(FrameError::RowOutOfBounds { index, len });
        }
        Ok(self.with_rows(RowIndex::from_vec(self.rows.compose(indices))))
    }

    /// Half-open slice `[from, to)` of the logical rows.
    ///
    /// A negative bound `b` stands for `b + num_rows() + 1`, so `-1` is one
    /// past the last row. When `from > to` the rows `[to, from)` come back in
    /// reverse order.
    pub fn slice_view(&self, from: isize, to: isize) -> FrameResult<Table> {
        let rows = self.num_rows();
        let resolve = |bound: isize| -> Option<usize> {
            let resolved = if bound < 0 {
                bound.checked_add(rows as isize + 1)?
            } else {
                bound
            };
            usize::try_from(resolved).ok().filter(|&b| b <= rows)
        };
        let (Some(start), Some(end)) = (resolve(from), resolve(to)) else {
            return Err(FrameError::InvalidSlice { from, to, rows });
        };

        if start <= end {
            return Ok(self.with_rows(self.rows.slice(start..end)));
        }
        let mut positions = self.rows.as_slice()[end..start].to_vec();
        positions.reverse();
        Ok(self.with_rows(RowIndex::from_vec(positions)))
    }

    /// Keeps logical row `j` when `mask[j]` is set.
    pub fn mask_view(&self, mask: &[bool]) -> FrameResult<Table> {
        if mask.len() != self.num_rows() {
            return Err(FrameError::MaskLengthMismatch {
                expected: self.num_rows(),
                actual: mask.len(),
            });
        }
        let positions = self
            .rows
            .iter()
            .zip(mask)
            .filter_map(|(p, &keep)| keep.then_some(p))
            .collect();
        Ok(self.with_rows(RowIndex::from_vec(positions)))
    }

    /// Projects onto `names`, in that order. An empty `names` keeps every
    /// column.
    pub fn column_view<S: AsRef<str>>(&self, names: &[S]) -> FrameResult<Table> {
        if names.is_empty() {
            return Ok(self.view());
        }
        let mut columns = ColumnMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !columns.contains_key(name) {
                columns.insert(name.to_owned(), self.raw.column(name)?.clone());
            }
        }
        let shared: ColumnHeader = columns.keys().cloned().collect();
        let raw = self.raw.derive_with(columns, shared);
        Ok(self.derive(raw, self.rows.clone()))
    }

    /// A uniformly random permutation of the rows.
    pub fn shuffle_view(&self) -> Table {
        self.shuffle_view_with(&mut rand::thread_rng())
    }

    pub fn shuffle_view_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Table {
        let mut positions = self.rows.as_slice().to_vec();
        positions.shuffle(rng);
        self.with_rows(RowIndex::from_vec(positions))
    }

    /// `n` distinct rows chosen uniformly, in random order. Sampling with
    /// replacement is not supported.
    pub fn sample_view(&self, n: usize, replacement: bool) -> FrameResult<Table> {
        self.sample_view_with(n, replacement, &mut rand::thread_rng())
    }

    pub fn sample_view_with<R: Rng + ?Sized>(
        &self,
        n: usize,
        replacement: bool,
        rng: &mut R,
    ) -> FrameResult<Table> {
        if replacement {
            return Err(FrameError::ReplacementSampling);
        }
        let available = self.num_rows();
        if n > available {
            return Err(FrameError::SampleTooLarge {
                requested: n,
                available,
            });
        }
        let picked = rand::seq::index::sample(rng, available, n).into_vec();
        Ok(self.with_rows(RowIndex::from_vec(self.rows.compose(&picked))))
    }

    /// Exactly `n` tables partitioning the rows in order, sizes differing by
    /// at most one. When `n` exceeds the row count the trailing tables are
    /// empty.
    pub fn split_n_view(&self, n: usize) -> Vec<Table> {
        let rows = self.num_rows();
        let mut out: Vec<Table> = GroupIndexer::new(rows, n)
            .map(|(_, range)| self.with_rows(self.rows.slice(range)))
            .collect();
        while out.len() < n {
            out.push(self.with_rows(self.rows.slice(rows..rows)));
        }
        out
    }

    /// Consecutive tables of `batch_size` rows; the last one may be smaller.
    /// A table without rows yields one empty table.
    pub fn split_view(&self, batch_size: usize) -> FrameResult<Vec<Table>> {
        if batch_size == 0 {
            return Err(FrameError::InvalidBatchSize);
        }
        let rows = self.num_rows();
        if rows == 0 {
            return Ok(vec![self.view()]);
        }
        Ok((0..rows)
            .step_by(batch_size)
            .map(|start| {
                let end = (start + batch_size).min(rows);
                self.with_rows(self.rows.slice(start..end))
            })
            .collect())
    }

    /// Splits into `(train, test)` without shuffling. The test table holds
    /// the last `floor(num_rows() * ratio)` rows.
    pub fn split_train_test_views(&self, ratio: f64) -> FrameResult<(Table, Table)> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(FrameError::InvalidRatio(ratio));
        }
        let rows = self.num_rows();
        let test = ((rows as f64 * ratio).floor() as usize).min(rows);
        let cut = rows - test;
        Ok((
            self.with_rows(self.rows.slice(0..cut)),
            self.with_rows(self.rows.slice(cut..rows)),
        ))
    }

    fn sort_column(&self, name: &str) -> FrameResult<SortColumn<'_>> {
        match self.raw.column(name)? {
            Column::Float(v) => Ok(SortColumn::Float(v.as_slice())),
            Column::Int(v) => Ok(SortColumn::Int(v.as_slice())),
            Column::Bool(v) => Ok(SortColumn::Bool(v.as_slice())),
            Column::Object(_) => Err(FrameError::NotNumeric(name.to_owned())),
        }
    }

    /// Rows in ascending order of `name`, ties kept in their current order.
    ///
    /// Bools sort false first and the missing integer sorts as `-1`. NaN
    /// positions are unspecified.
    pub fn sorted_view(&self, name: &str) -> FrameResult<Table> {
        let column = self.sort_column(name)?;
        let mut positions = self.rows.as_slice().to_vec();
        positions.sort_by(|&a, &b| column.compare(a, b));
        Ok(self.with_rows(RowIndex::from_vec(positions)))
    }

    /// The `n` smallest (`ascending`) or largest rows by `name`. With
    /// `sorted == false` the rows come back in no particular order.
    pub fn top_view(
        &self,
        name: &str,
        n: usize,
        ascending: bool,
        sorted: bool,
    ) -> FrameResult<Table> {
        let column = self.sort_column(name)?;
        let compare = |a: &usize, b: &usize| {
            let order = column.compare(*a, *b);
            if ascending {
                order
            } else {
                order.reverse()
            }
        };
        let mut positions = self.rows.as_slice().to_vec();
        let n = n.min(positions.len());
        if sorted {
            positions.sort_by(compare);
        } else if n > 0 && n < positions.len() {
            positions.select_nth_unstable_by(n - 1, compare);
        }
        positions.truncate(n);
        Ok(self.with_rows(RowIndex::from_vec(positions)))
    }

    pub fn reverse_view(&self) -> Table {
        let mut positions = self.rows.as_slice().to_vec();
        positions.reverse();
        self.with_rows(RowIndex::from_vec(positions))
    }

    /// Same rows with the physical positions in ascending order, for
    /// sequential access. Discards any shuffle.
    pub fn reset_index_view(&self) -> Table {
        let mut positions = self.rows.as_slice().to_vec();
        positions.sort_unstable();
        self.with_rows(RowIndex::from_vec(positions))
    }

    /// A view whose `names` columns (all columns when empty) own their data
    /// and can be written without affecting any other table.
    pub fn detached_view<S: AsRef<str>>(&self, names: &[S]) -> FrameResult<Table> {
        let mut view = self.view();
        view.unshare(names)?;
        Ok(view)
    }

    pub fn detached_view_all(&self) -> Table {
        let mut view = self.view();
        view.raw.unshare_all();
        view
    }
}
