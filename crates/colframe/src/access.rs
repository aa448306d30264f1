//! Typed column handles bound to a table's row index.
//!
//! Read handles borrow the table immutably and may coexist. Write handles
//! need `&mut Table`; obtaining one copies the column's array first if any
//! other table still aliases it.

use std::borrow::Cow;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use crate::column::Object;
use crate::error::{FrameError, FrameResult};
use crate::row_index::RowIndex;
use crate::table::Table;

/// Read-only handle over one column. Logical row `i` resolves to physical
/// row `row_index[i]`.
#[derive(Debug)]
pub struct ColumnAccess<'a, T> {
    values: &'a [T],
    rows: &'a RowIndex,
}

impl<T> Clone for ColumnAccess<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ColumnAccess<'_, T> {}

pub type FloatAccess<'a> = ColumnAccess<'a, f64>;
pub type IntAccess<'a> = ColumnAccess<'a, i64>;
pub type BoolAccess<'a> = ColumnAccess<'a, bool>;
pub type ObjectAccess<'a> = ColumnAccess<'a, Option<Object>>;

impl<'a, T> ColumnAccess<'a, T> {
    /// Number of logical rows.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Panics if `row >= size()`.
    pub fn get(&self, row: usize) -> &'a T {
        let values: &'a [T] = self.values;
        &values[self.physical_row(row)]
    }

    pub fn try_get(&self, row: usize) -> Option<&'a T> {
        let values: &'a [T] = self.values;
        self.rows.get(row).and_then(|p| values.get(p))
    }

    /// Physical position backing logical row `row`.
    pub fn physical_row(&self, row: usize) -> usize {
        match self.rows.get(row) {
            Some(p) => p,
            None => panic!("row {row} out of bounds for {} rows", self.size()),
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a T> + 'a {
        let values: &'a [T] = self.values;
        let rows: &'a RowIndex = self.rows;
        rows.as_slice().iter().map(move |&p| &values[p])
    }

    /// The backing array itself when the logical rows are one ascending run
    /// of physical rows.
    pub fn as_slice(&self) -> Option<&'a [T]> {
        if self.rows.is_empty() {
            return Some(&[]);
        }
        let values: &'a [T] = self.values;
        self.rows.contiguous_range().map(|range| &values[range])
    }
}

impl<'a, T: Clone> ColumnAccess<'a, T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Borrows the backing array when possible, copies otherwise.
    pub fn as_cow(&self) -> Cow<'a, [T]> {
        match self.as_slice() {
            Some(slice) => Cow::Borrowed(slice),
            None => Cow::Owned(self.to_vec()),
        }
    }
}

impl<T> Index<usize> for ColumnAccess<'_, T> {
    type Output = T;

    fn index(&self, row: usize) -> &T {
        self.get(row)
    }
}

/// Read-only handle over a string column.
#[derive(Clone, Copy, Debug)]
pub struct StringAccess<'a> {
    inner: ObjectAccess<'a>,
}

impl<'a> StringAccess<'a> {
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// `None` for a missing entry.
    pub fn get(&self, row: usize) -> Option<&'a str> {
        self.inner.get(row).as_ref().and_then(Object::as_str)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<&'a str>> + 'a {
        self.inner
            .iter()
            .map(|entry| entry.as_ref().and_then(Object::as_str))
    }
}

/// Writable handle over one column. The array is exclusively owned by the
/// table it came from.
#[derive(Debug)]
pub struct ColumnAccessMut<'a, T> {
    values: &'a mut [T],
    rows: &'a RowIndex,
}

pub type FloatAccessMut<'a> = ColumnAccessMut<'a, f64>;
pub type IntAccessMut<'a> = ColumnAccessMut<'a, i64>;
pub type BoolAccessMut<'a> = ColumnAccessMut<'a, bool>;
pub type ObjectAccessMut<'a> = ColumnAccessMut<'a, Option<Object>>;

impl<T> ColumnAccessMut<'_, T> {
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    fn physical_row(&self, row: usize) -> usize {
        match self.rows.get(row) {
            Some(p) => p,
            None => panic!("row {row} out of bounds for {} rows", self.size()),
        }
    }

    pub fn get(&self, row: usize) -> &T {
        &self.values[self.physical_row(row)]
    }

    /// Writes logical row `row`. Panics if `row >= size()`.
    pub fn set(&mut self, row: usize, value: T) {
        let p = self.physical_row(row);
        self.values[p] = value;
    }
}

impl<T> Index<usize> for ColumnAccessMut<'_, T> {
    type Output = T;

    fn index(&self, row: usize) -> &T {
        self.get(row)
    }
}

impl<T> IndexMut<usize> for ColumnAccessMut<'_, T> {
    fn index_mut(&mut self, row: usize) -> &mut T {
        let p = self.physical_row(row);
        &mut self.values[p]
    }
}

#[derive(Debug)]
pub struct StringAccessMut<'a> {
    inner: ObjectAccessMut<'a>,
}

impl StringAccessMut<'_> {
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.inner.get(row).as_ref().and_then(Object::as_str)
    }

    /// Writes a string, or the missing marker for `None`.
    pub fn set(&mut self, row: usize, value: Option<&str>) {
        self.inner
            .set(row, value.map(|s| Object::String(Arc::from(s))));
    }
}

impl Table {
    pub fn floats(&self, name: &str) -> FrameResult<FloatAccess<'_>> {
        Ok(ColumnAccess {
            values: self.raw.float_values(name)?,
            rows: &self.rows,
        })
    }

    pub fn ints(&self, name: &str) -> FrameResult<IntAccess<'_>> {
        Ok(ColumnAccess {
            values: self.raw.int_values(name)?,
            rows: &self.rows,
        })
    }

    pub fn bools(&self, name: &str) -> FrameResult<BoolAccess<'_>> {
        Ok(ColumnAccess {
            values: self.raw.bool_values(name)?,
            rows: &self.rows,
        })
    }

    pub fn objects(&self, name: &str) -> FrameResult<ObjectAccess<'_>> {
        Ok(ColumnAccess {
            values: self.raw.object_values(name)?,
            rows: &self.rows,
        })
    }

    pub fn strings(&self, name: &str) -> FrameResult<StringAccess<'_>> {
        self.check_string_column(name)?;
        Ok(StringAccess {
            inner: self.objects(name)?,
        })
    }

    pub(crate) fn check_string_column(&self, name: &str) -> FrameResult<()> {
        self.raw.column(name)?;
        if !self.raw.is_string_column(name) {
            return Err(FrameError::NotAStringColumn(name.to_owned()));
        }
        Ok(())
    }

    pub fn floats_mut(&mut self, name: &str) -> FrameResult<FloatAccessMut<'_>> {
        Ok(ColumnAccessMut {
            values: self.raw.float_values_mut(name)?,
            rows: &self.rows,
        })
    }

    pub fn ints_mut(&mut self, name: &str) -> FrameResult<IntAccessMut<'_>> {
        Ok(ColumnAccessMut {
            values: self.raw.int_values_mut(name)?,
            rows: &self.rows,
        })
    }

    pub fn bools_mut(&mut self, name: &str) -> FrameResult<BoolAccessMut<'_>> {
        Ok(ColumnAccessMut {
            values: self.raw.bool_values_mut(name)?,
            rows: &self.rows,
        })
    }

    /// Writable handle over a generic object column. String columns are
    /// refused; use [`Table::strings_mut`] for them. Storing a string in a
    /// generic column breaks [`Table::check_consistency`].
    pub fn objects_mut(&mut self, name: &str) -> FrameResult<ObjectAccessMut<'_>> {
        self.raw.column(name)?;
        if self.raw.is_string_column(name) {
            return Err(FrameError::StringColumn(name.to_owned()));
        }
        self.object_access_mut(name)
    }

    pub fn strings_mut(&mut self, name: &str) -> FrameResult<StringAccessMut<'_>> {
        self.check_string_column(name)?;
        Ok(StringAccessMut {
            inner: self.object_access_mut(name)?,
        })
    }

    fn object_access_mut(&mut self, name: &str) -> FrameResult<ObjectAccessMut<'_>> {
        Ok(ColumnAccessMut {
            values: self.raw.object_values_mut(name)?,
            rows: &self.rows,
        })
    }
}
