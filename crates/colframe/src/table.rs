use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

use crate::column::ColumnKind;
use crate::error::{FrameError, FrameResult};
use crate::header::ColumnHeader;
use crate::identity::DataIdentity;
use crate::raw::{ColumnMap, RawTable};
use crate::row_index::RowIndex;

/// Knobs applied with [`Table::with_options`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Worker cap for column-wise work; `0` means the hardware parallelism.
    pub max_parallelism: usize,
    /// Allocate a fresh buffer for every mask instead of reusing the table's
    /// scratch buffer.
    pub thread_safe_masking: bool,
}

/// A logical view over a [`RawTable`].
///
/// Every view operation returns a new `Table` that aliases the parent's
/// column arrays through a different [`RowIndex`]. Reads go through the row
/// index; writes need `&mut Table` and copy any aliased array first, so
/// mutating a view never changes its parent.
#[derive(Debug)]
pub struct Table {
    pub(crate) raw: RawTable,
    pub(crate) rows: RowIndex,
    identity_index: bool,
    mask_scratch: Mutex<Vec<bool>>,
    thread_safe_masking: bool,
}

/// Boolean buffer sized to a table's row count, either borrowed from the
/// table's scratch space or freshly allocated.
#[derive(Debug)]
pub enum Mask<'a> {
    Scratch(MutexGuard<'a, Vec<bool>>),
    Owned(Vec<bool>),
}

impl Deref for Mask<'_> {
    type Target = [bool];

    fn deref(&self) -> &[bool] {
        match self {
            Mask::Scratch(guard) => guard.as_slice(),
            Mask::Owned(values) => values.as_slice(),
        }
    }
}

impl DerefMut for Mask<'_> {
    fn deref_mut(&mut self) -> &mut [bool] {
        match self {
            Mask::Scratch(guard) => guard.as_mut_slice(),
            Mask::Owned(values) => values.as_mut_slice(),
        }
    }
}

impl Mask<'_> {
    /// Detaches the contents from the table's scratch buffer.
    pub fn into_vec(self) -> Vec<bool> {
        match self {
            Mask::Scratch(guard) => guard.clone(),
            Mask::Owned(values) => values,
        }
    }
}

impl Clone for Table {
    fn clone(&self) -> Self {
        self.view()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::from_raw(RawTable::new())
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_raw(raw: RawTable) -> Self {
        let rows = RowIndex::identity(raw.num_allocated_rows());
        Self {
            raw,
            rows,
            identity_index: true,
            mask_scratch: Mutex::new(Vec::new()),
            thread_safe_masking: false,
        }
    }

    /// A table over `raw` and `rows` inheriting this table's settings.
    pub(crate) fn derive(&self, raw: RawTable, rows: RowIndex) -> Self {
        let identity_index = rows.is_identity_over(raw.num_allocated_rows());
        log::trace!(
            "derived view: {} rows over {} physical rows, {} columns",
            rows.len(),
            raw.num_allocated_rows(),
            raw.num_columns()
        );
        Self {
            raw,
            rows,
            identity_index,
            mask_scratch: Mutex::new(Vec::new()),
            thread_safe_masking: self.thread_safe_masking,
        }
    }

    /// A view over the same columns with a different row index.
    pub(crate) fn with_rows(&self, rows: RowIndex) -> Self {
        self.derive(self.raw.clone(), rows)
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.raw.set_max_parallelism(options.max_parallelism);
        self.thread_safe_masking = options.thread_safe_masking;
        self
    }

    pub fn set_thread_safe_masking(&mut self, enabled: bool) {
        self.thread_safe_masking = enabled;
    }

    pub fn thread_safe_masking(&self) -> bool {
        self.thread_safe_masking
    }

    pub fn max_parallelism(&self) -> usize {
        self.raw.max_parallelism()
    }

    pub fn set_max_parallelism(&mut self, max_parallelism: usize) {
        self.raw.set_max_parallelism(max_parallelism);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.raw.num_columns()
    }

    pub fn row_index(&self) -> &RowIndex {
        &self.rows
    }

    /// Whether the row index is exactly `0..n` over all physical rows.
    pub fn is_identity_index(&self) -> bool {
        self.identity_index
    }

    pub fn raw(&self) -> &RawTable {
        &self.raw
    }

    pub fn contains(&self, name: &str) -> bool {
        self.raw.contains(name)
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.raw.column_kind(name)
    }

    pub fn is_string_column(&self, name: &str) -> bool {
        self.raw.is_string_column(name)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<String> {
        self.raw.column_names()
    }

    pub fn header(&self) -> ColumnHeader {
        self.raw.header()
    }

    pub fn float_header(&self) -> ColumnHeader {
        self.raw.float_header()
    }

    pub fn int_header(&self) -> ColumnHeader {
        self.raw.int_header()
    }

    pub fn bool_header(&self) -> ColumnHeader {
        self.raw.bool_header()
    }

    pub fn object_header(&self) -> ColumnHeader {
        self.raw.object_header()
    }

    pub fn string_header(&self) -> ColumnHeader {
        self.raw.string_header()
    }

    /// Checks the raw table invariants plus the row index bounds.
    pub fn check_consistency(&self) -> FrameResult<()> {
        self.raw.check_consistency()?;
        let len = self.raw.num_allocated_rows();
        if let Some(index) = self.rows.iter().find(|&p| p >= len) {
            return Err(FrameError::RowOutOfBounds { index, len });
        }
        if self.identity_index != self.rows.is_identity_over(len) {
            return Err(FrameError::Inconsistent(
                "identity flag disagrees with the row index".to_owned(),
            ));
        }
        Ok(())
    }

    fn mask(&self, zeroed: bool) -> Mask<'_> {
        let rows = self.num_rows();
        if self.thread_safe_masking {
            return Mask::Owned(vec![false; rows]);
        }
        match self.mask_scratch.try_lock() {
            Ok(mut scratch) => {
                if zeroed {
                    scratch.clear();
                }
                scratch.resize(rows, false);
                Mask::Scratch(scratch)
            }
            // Busy or poisoned scratch: fall back to a fresh buffer.
            Err(_) => Mask::Owned(vec![false; rows]),
        }
    }

    /// An all-false mask of `num_rows()` entries.
    pub fn zero_mask(&self) -> Mask<'_> {
        self.mask(true)
    }

    /// A mask of `num_rows()` entries whose contents are unspecified.
    pub fn empty_mask(&self) -> Mask<'_> {
        self.mask(false)
    }

    /// The shallowest derived table: same columns, same rows.
    pub fn view(&self) -> Table {
        self.with_rows(self.rows.clone())
    }

    /// A table over the same rows and column arrays but its own column
    /// mapping, every column marked shared.
    pub fn shallow_copy(&self) -> Table {
        let columns: ColumnMap = (*self.raw.columns).clone();
        let shared = self.raw.header();
        let raw = self.raw.derive_with(columns, shared);
        self.derive(raw, self.rows.clone())
    }

    /// Deep copy of the current logical rows. The result owns all of its
    /// data and has an identity row index.
    pub fn copy(&self) -> Table {
        let positions = self.rows.as_slice();
        let columns: ColumnMap = self
            .raw
            .columns
            .iter()
            .map(|(name, column)| {
                let copied = if self.identity_index {
                    column.deep_copy()
                } else {
                    column.gather(positions)
                };
                (name.clone(), copied)
            })
            .collect();
        let mut raw = RawTable::from_columns(
            columns,
            self.raw.string_header.clone(),
            self.raw.max_parallelism(),
            self.num_rows(),
        );
        raw.set_data_identity(DataIdentity::random());
        log::debug!(
            "copied {} rows x {} columns (identity index: {})",
            self.num_rows(),
            self.num_columns(),
            self.identity_index
        );
        let mut table = Table::from_raw(raw);
        table.thread_safe_masking = self.thread_safe_masking;
        table
    }

    fn check_physical_rows(&self, other: &RawTable) -> FrameResult<()> {
        let expected = self.raw.num_allocated_rows();
        let actual = other.num_allocated_rows();
        if expected != actual {
            return Err(FrameError::RowCountMismatch {
                table: 0,
                expected,
                actual,
            });
        }
        Ok(())
    }

    pub fn alloc_floats<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.raw.alloc_floats(names)
    }

    pub fn alloc_ints<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.raw.alloc_ints(names)
    }

    pub fn alloc_bools<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.raw.alloc_bools(names)
    }

    pub fn alloc_objects<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.raw.alloc_objects(names)
    }

    pub fn alloc_strings<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.raw.alloc_strings(names)
    }

    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        self.raw.drop_columns(names);
    }

    pub fn rename(&mut self, old: &str, new: &str) -> FrameResult<()> {
        self.raw.rename(old, new)
    }

    pub fn unshare<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.raw.unshare(names)
    }

    pub fn int_to_float<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.raw.int_to_float(names)
    }

    pub fn bool_to_float<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.raw.bool_to_float(names)
    }

    /// Adds `other`'s columns by reference. The physical row counts must
    /// match, since this table's row index addresses the new columns too.
    pub fn transfer_from(&mut self, other: &RawTable) -> FrameResult<()> {
        self.check_physical_rows(other)?;
        self.raw.transfer_from(other)
    }
}
