use colframe_work::hardware_parallelism;
use std::sync::Arc;

use crate::column::{Column, ColumnKind, Object};
use crate::error::{FrameError, FrameResult};
use crate::header::ColumnHeader;
use crate::raw::{ColumnMap, RawTable};
use crate::table::Table;

/// Assembles a table column by column.
///
/// Columns may differ in length while building; [`TableBuilder::build`]
/// checks that they agree. The first failing call is remembered and reported
/// by `build`, so calls can be chained freely.
///
/// ```
/// use colframe::TableBuilder;
///
/// let table = TableBuilder::new()
///     .add_floats("height", [1.72, 1.85])
///     .add_strings("name", [Some("ana"), None])
///     .build()
///     .unwrap();
/// assert_eq!(table.num_rows(), 2);
/// assert!(table.is_string_column("name"));
/// ```
#[derive(Debug)]
pub struct TableBuilder {
    columns: ColumnMap,
    string_header: ColumnHeader,
    max_parallelism: usize,
    error: Option<FrameError>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            columns: ColumnMap::new(),
            string_header: ColumnHeader::new(),
            max_parallelism: hardware_parallelism(),
            error: None,
        }
    }

    pub fn max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism;
        self
    }

    fn fail(&mut self, err: FrameError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// The column `name`, created empty if missing, unless it has another
    /// type or an earlier call failed.
    fn column(&mut self, name: &str, kind: ColumnKind) -> Option<&mut Column> {
        if self.error.is_some() {
            return None;
        }
        if let Some(actual) = self.columns.get(name).map(Column::kind) {
            if actual != kind {
                self.fail(FrameError::ColumnTypeMismatch {
                    column: name.to_owned(),
                    expected: kind,
                    actual,
                });
                return None;
            }
        }
        Some(
            self.columns
                .entry(name.to_owned())
                .or_insert_with(|| Column::empty(kind)),
        )
    }

    pub fn add_floats(mut self, name: &str, values: impl IntoIterator<Item = f64>) -> Self {
        if let Some(Column::Float(column)) = self.column(name, ColumnKind::Float) {
            Arc::make_mut(column).extend(values);
        }
        self
    }

    pub fn add_ints(mut self, name: &str, values: impl IntoIterator<Item = i64>) -> Self {
        if let Some(Column::Int(column)) = self.column(name, ColumnKind::Int) {
            Arc::make_mut(column).extend(values);
        }
        self
    }

    pub fn add_bools(mut self, name: &str, values: impl IntoIterator<Item = bool>) -> Self {
        if let Some(Column::Bool(column)) = self.column(name, ColumnKind::Bool) {
            Arc::make_mut(column).extend(values);
        }
        self
    }

    pub fn add_objects(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = Option<Object>>,
    ) -> Self {
        if let Some(Column::Object(column)) = self.column(name, ColumnKind::Object) {
            Arc::make_mut(column).extend(values);
        }
        self
    }

    /// Appends strings (`None` for missing) and marks the column as a string
    /// column. Appending to a generic object column is an error.
    pub fn add_strings<S: AsRef<str>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        let existing_generic =
            self.columns.contains_key(name) && !self.string_header.contains(name);
        if existing_generic && self.columns[name].kind() == ColumnKind::Object {
            self.fail(FrameError::NotAStringColumn(name.to_owned()));
            return self;
        }
        if let Some(Column::Object(column)) = self.column(name, ColumnKind::Object) {
            Arc::make_mut(column).extend(
                values
                    .into_iter()
                    .map(|v| v.map(|s| Object::String(Arc::from(s.as_ref())))),
            );
            self.string_header.insert(name);
        }
        self
    }

    /// Marks an existing object column as a string column. Its entries must
    /// all be strings or missing, which `build` verifies.
    pub fn mark_as_string(mut self, name: &str) -> Self {
        match self.columns.get(name).map(Column::kind) {
            Some(ColumnKind::Object) => {
                self.string_header.insert(name);
            }
            Some(actual) => self.fail(FrameError::ColumnTypeMismatch {
                column: name.to_owned(),
                expected: ColumnKind::Object,
                actual,
            }),
            None => self.fail(FrameError::UnknownColumn(name.to_owned())),
        }
        self
    }

    fn set(mut self, name: &str, column: Column, string: bool) -> Self {
        self.columns.insert(name.to_owned(), column);
        if string {
            self.string_header.insert(name);
        } else {
            self.string_header.remove(name);
        }
        self
    }

    /// Replaces (or creates) a column, whatever its previous type.
    pub fn set_floats(self, name: &str, values: Vec<f64>) -> Self {
        self.set(name, Column::Float(Arc::new(values)), false)
    }

    pub fn set_ints(self, name: &str, values: Vec<i64>) -> Self {
        self.set(name, Column::Int(Arc::new(values)), false)
    }

    pub fn set_bools(self, name: &str, values: Vec<bool>) -> Self {
        self.set(name, Column::Bool(Arc::new(values)), false)
    }

    pub fn set_objects(self, name: &str, values: Vec<Option<Object>>) -> Self {
        self.set(name, Column::Object(Arc::new(values)), false)
    }

    /// Returns the table without validation. Use
    /// [`RawTable::check_consistency`] or [`RawTable::into_table`] to check
    /// it later.
    pub fn into_raw(self) -> RawTable {
        let rows = self.columns.values().next().map(Column::len).unwrap_or(0);
        let mut raw =
            RawTable::from_columns(self.columns, self.string_header, 0, rows);
        raw.set_max_parallelism(self.max_parallelism);
        raw
    }

    /// Validates column lengths and string columns, then promotes the result
    /// to a [`Table`] with an identity row index.
    pub fn build(mut self) -> FrameResult<Table> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        for name in &self.string_header {
            let values = self.columns.get(name).and_then(Column::as_object);
            if let Some(row) = values.and_then(|v| {
                v.iter()
                    .position(|e| matches!(e, Some(object) if !object.is_string()))
            }) {
                return Err(FrameError::UnexpectedObject {
                    column: name.clone(),
                    row,
                });
            }
        }
        let raw = self.into_raw();
        log::debug!(
            "built table: {} rows x {} columns",
            raw.num_allocated_rows(),
            raw.num_columns()
        );
        raw.into_table()
    }
}
