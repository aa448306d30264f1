//! Row-by-row numeric reads over a fixed set of columns.

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::row_index::RowIndex;
use crate::table::Table;

/// Rows copied per refill of a [`RowIterator`] block.
pub const BLOCK_ROWS: usize = 128;

/// Numeric type numeric columns are coerced to on read.
pub trait Element: Copy + Default + Send + Sync + 'static {
    fn from_f64(value: f64) -> Self;
    fn from_i64(value: i64) -> Self;

    fn from_bool(value: bool) -> Self {
        Self::from_i64(i64::from(value))
    }
}

impl Element for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn from_i64(value: i64) -> Self {
        value as f64
    }
}

impl Element for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn from_i64(value: i64) -> Self {
        value as f32
    }
}

/// A resolved numeric column.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Source<'a> {
    Float(&'a [f64]),
    Int(&'a [i64]),
    Bool(&'a [bool]),
}

impl Source<'_> {
    #[inline]
    pub(crate) fn read<T: Element>(&self, physical: usize) -> T {
        match self {
            Source::Float(v) => T::from_f64(v[physical]),
            Source::Int(v) => T::from_i64(v[physical]),
            Source::Bool(v) => T::from_bool(v[physical]),
        }
    }
}

/// Looks up `columns` in `table`, rejecting object columns.
pub(crate) fn resolve_sources<'a, S: AsRef<str>>(
    table: &'a Table,
    columns: &[S],
) -> FrameResult<Vec<Source<'a>>> {
    columns
        .iter()
        .map(|name| {
            let name = name.as_ref();
            match table.raw.column(name)? {
                Column::Float(v) => Ok(Source::Float(v.as_slice())),
                Column::Int(v) => Ok(Source::Int(v.as_slice())),
                Column::Bool(v) => Ok(Source::Bool(v.as_slice())),
                Column::Object(_) => Err(FrameError::NotNumeric(name.to_owned())),
            }
        })
        .collect()
}

/// One row handed out by [`RowIterator::next_row`]. The values live in the
/// iterator's buffer and are overwritten by the next call.
#[derive(Debug, PartialEq)]
pub struct Row<'b, T> {
    pub values: &'b [T],
    /// Position in the table's logical row order.
    pub logical: usize,
    /// Position in the backing arrays.
    pub physical: usize,
}

/// Reads a table row by row, coercing float, int and bool columns to `T`.
///
/// Values are copied in blocks of [`BLOCK_ROWS`] rows into a buffer that is
/// reused across blocks and across [`RowIterator::reset`] calls. This is a
/// lending iterator: each row borrows the iterator.
#[derive(Debug)]
pub struct RowIterator<'a, T> {
    columns: Vec<String>,
    sources: Vec<Source<'a>>,
    rows: &'a RowIndex,
    block: Vec<T>,
    block_start: usize,
    block_len: usize,
    cursor: usize,
}

pub type Float32Iterator<'a> = RowIterator<'a, f32>;
pub type Float64Iterator<'a> = RowIterator<'a, f64>;

impl<'a, T: Element> RowIterator<'a, T> {
    /// Iterates `columns` of `table` in the given order.
    pub fn new<S: AsRef<str>>(table: &'a Table, columns: &[S]) -> FrameResult<Self> {
        let sources = resolve_sources(table, columns)?;
        Ok(Self {
            columns: columns.iter().map(|c| c.as_ref().to_owned()).collect(),
            sources,
            rows: table.row_index(),
            block: Vec::with_capacity(BLOCK_ROWS * columns.len()),
            block_start: 0,
            block_len: 0,
            cursor: 0,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of values per row.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Rewinds onto another table with the same columns, keeping the
    /// buffer. On error the iterator is left unchanged.
    pub fn reset(&mut self, table: &'a Table) -> FrameResult<()> {
        self.sources = resolve_sources(table, &self.columns)?;
        self.rows = table.row_index();
        self.block_start = 0;
        self.block_len = 0;
        self.cursor = 0;
        Ok(())
    }

    fn fill_block(&mut self) {
        let width = self.sources.len();
        let start = self.block_start + self.block_len;
        let end = (start + BLOCK_ROWS).min(self.rows.len());
        let positions = &self.rows.as_slice()[start..end];

        self.block.clear();
        self.block.resize(positions.len() * width, T::default());
        for (r, &p) in positions.iter().enumerate() {
            let row = &mut self.block[r * width..(r + 1) * width];
            for (slot, source) in row.iter_mut().zip(&self.sources) {
                *slot = source.read(p);
            }
        }
        self.block_start = start;
        self.block_len = positions.len();
    }

    /// The next row, or `None` once every row has been read.
    pub fn next_row(&mut self) -> Option<Row<'_, T>> {
        if self.cursor >= self.rows.len() {
            return None;
        }
        if self.cursor >= self.block_start + self.block_len {
            self.fill_block();
        }
        let logical = self.cursor;
        self.cursor += 1;

        let width = self.sources.len();
        let offset = (logical - self.block_start) * width;
        Some(Row {
            values: &self.block[offset..offset + width],
            logical,
            physical: self.rows.as_slice()[logical],
        })
    }
}

impl Table {
    pub fn row_iterator<T: Element, S: AsRef<str>>(
        &self,
        columns: &[S],
    ) -> FrameResult<RowIterator<'_, T>> {
        RowIterator::new(self, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableBuilder;

    #[test]
    fn crosses_block_boundaries() {
        let n = BLOCK_ROWS * 2 + 5;
        let table = TableBuilder::new()
            .set_ints("i", (0..n as i64).collect())
            .set_bools("b", (0..n).map(|i| i % 2 == 0).collect())
            .build()
            .unwrap()
            .reverse_view();

        let mut iter = Float64Iterator::new(&table, &["i", "b"]).unwrap();
        let mut seen = 0;
        while let Some(row) = iter.next_row() {
            let expected = (n - 1 - row.logical) as f64;
            assert_eq!(row.values[0], expected);
            assert_eq!(row.values[1], if row.physical % 2 == 0 { 1.0 } else { 0.0 });
            assert_eq!(row.physical, n - 1 - row.logical);
            seen += 1;
        }
        assert_eq!(seen, n);
        assert!(iter.next_row().is_none());
    }

    #[test]
    fn reset_recycles_for_another_table() {
        let a = TableBuilder::new().set_floats("x", vec![1.0, 2.0]).build().unwrap();
        let b = TableBuilder::new().set_floats("x", vec![5.0]).build().unwrap();
        let c = TableBuilder::new().set_ints("y", vec![5]).build().unwrap();

        let mut iter = Float32Iterator::new(&a, &["x"]).unwrap();
        assert_eq!(iter.next_row().unwrap().values, &[1.0f32]);
        iter.reset(&b).unwrap();
        assert_eq!(iter.next_row().unwrap().values, &[5.0f32]);
        assert!(iter.next_row().is_none());
        assert_eq!(
            iter.reset(&c),
            Err(FrameError::UnknownColumn("x".to_owned()))
        );
    }

    #[test]
    fn object_columns_are_rejected() {
        let table = TableBuilder::new()
            .add_strings("s", [Some("x")])
            .build()
            .unwrap();
        assert_eq!(
            table.row_iterator::<f64, _>(&["s"]).unwrap_err(),
            FrameError::NotNumeric("s".to_owned())
        );
    }
}
