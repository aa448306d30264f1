//! Row-wise and column-wise concatenation of tables.

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::header::ColumnHeader;
use crate::raw::{ColumnMap, RawTable};
use crate::table::Table;

/// Fails on the first column name shared by two of `tables`.
pub fn check_no_column_overlap(tables: &[&Table]) -> FrameResult<()> {
    let mut seen = ColumnHeader::new();
    for (k, table) in tables.iter().enumerate() {
        for name in table.raw.columns.keys() {
            if !seen.insert(name.clone()) {
                return Err(FrameError::ColumnOverlap {
                    column: name.clone(),
                    table: k,
                });
            }
        }
    }
    Ok(())
}

fn check_same_columns(first: &Table, other: &Table, table: usize) -> FrameResult<()> {
    for (name, column) in first.raw.columns.iter() {
        match other.column_kind(name) {
            None => {
                return Err(FrameError::MissingColumn {
                    column: name.clone(),
                    table,
                })
            }
            Some(actual) if actual != column.kind() => {
                return Err(FrameError::ColumnTypeMismatch {
                    column: name.clone(),
                    expected: column.kind(),
                    actual,
                })
            }
            Some(_) => {}
        }
    }
    if other.num_columns() != first.num_columns() {
        return Err(FrameError::ColumnSetMismatch { table });
    }
    Ok(())
}

/// Stacks the current rows of `tables` into a new table. All tables must
/// have the same columns with the same types; the data is copied.
pub fn row_concat(tables: &[&Table]) -> FrameResult<Table> {
    let Some(first) = tables.first() else {
        return Err(FrameError::EmptyInput);
    };
    for (k, table) in tables.iter().enumerate().skip(1) {
        check_same_columns(first, table, k)?;
    }

    let total: usize = tables.iter().map(|t| t.num_rows()).sum();
    let mut columns = ColumnMap::with_capacity(first.num_columns());
    for (name, column) in first.raw.columns.iter() {
        let mut merged = Column::empty(column.kind());
        merged.reserve(total);
        for table in tables {
            merged.extend_gathered(table.raw.column(name)?, table.rows.as_slice());
        }
        columns.insert(name.clone(), merged);
    }
    let string_header = tables
        .iter()
        .fold(ColumnHeader::new(), |acc, t| acc.and(&t.raw.string_header));

    log::debug!(
        "row concat: {} tables into {total} rows x {} columns",
        tables.len(),
        columns.len()
    );
    let mut raw = RawTable::from_columns(columns, string_header, 0, total);
    raw.set_max_parallelism(first.max_parallelism());
    raw.into_table()
}

/// Puts the columns of `tables` side by side without copying.
///
/// Every table must select the same physical rows in the same order over
/// equally long arrays, which holds for tables derived from one another by
/// column operations only. Otherwise fails with `RowCountMismatch` (different
/// row counts) or `IndexMismatch`.
pub fn column_concat_view(tables: &[&Table]) -> FrameResult<Table> {
    let Some(first) = tables.first() else {
        return Err(FrameError::EmptyInput);
    };
    check_no_column_overlap(tables)?;
    for (k, table) in tables.iter().enumerate().skip(1) {
        if table.num_rows() != first.num_rows() {
            return Err(FrameError::RowCountMismatch {
                table: k,
                expected: first.num_rows(),
                actual: table.num_rows(),
            });
        }
        if table.raw.num_allocated_rows() != first.raw.num_allocated_rows()
            || table.rows != first.rows
        {
            return Err(FrameError::IndexMismatch);
        }
    }

    let mut raw = RawTable::new();
    for table in tables {
        raw.transfer_from(&table.raw)?;
    }
    raw.set_max_parallelism(first.max_parallelism());
    Ok(first.derive(raw, first.rows.clone()))
}

/// Copies every table's current rows, then puts the copies side by side.
/// Only the row counts need to agree.
pub fn column_copy_concat(tables: &[&Table]) -> FrameResult<Table> {
    let Some(first) = tables.first() else {
        return Err(FrameError::EmptyInput);
    };
    check_no_column_overlap(tables)?;
    for (k, table) in tables.iter().enumerate().skip(1) {
        if table.num_rows() != first.num_rows() {
            return Err(FrameError::RowCountMismatch {
                table: k,
                expected: first.num_rows(),
                actual: table.num_rows(),
            });
        }
    }
    let copies: Vec<Table> = tables.iter().map(|t| t.copy()).collect();
    let refs: Vec<&Table> = copies.iter().collect();
    column_concat_view(&refs)
}

/// [`column_concat_view`] when the row indices allow it,
/// [`column_copy_concat`] otherwise.
pub fn column_smart_concat(tables: &[&Table]) -> FrameResult<Table> {
    match column_concat_view(tables) {
        Err(FrameError::IndexMismatch) => {
            log::debug!("column concat: row indices differ, copying");
            column_copy_concat(tables)
        }
        other => other,
    }
}
