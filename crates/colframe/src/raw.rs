use colframe_work::{hardware_parallelism, ColumnQueue};
use indexmap::IndexMap;
use std::sync::Arc;

use crate::column::{Column, ColumnKind, Object};
use crate::error::{FrameError, FrameResult};
use crate::header::ColumnHeader;
use crate::identity::{DataIdentity, StructureIdentity};
use crate::table::Table;

pub(crate) type ColumnMap = IndexMap<String, Column>;

/// Physical column storage, unaware of any row index.
///
/// Column arrays are reference counted. A column listed in
/// [`RawTable::shared_columns`] may be aliased by another table; writes to it
/// are preceded by a copy (see [`RawTable::unshare`]). When the whole column
/// mapping is aliased ([`RawTable::is_fully_shared`]), structural changes
/// first give this table its own mapping, leaving the other table untouched.
///
/// Cloning a `RawTable` yields such a fully shared alias.
#[derive(Debug)]
pub struct RawTable {
    pub(crate) columns: Arc<ColumnMap>,
    pub(crate) string_header: ColumnHeader,
    pub(crate) shared: ColumnHeader,
    pub(crate) fully_shared: bool,
    /// Row count reported while the table has no columns.
    pub(crate) empty_rows: usize,
    max_parallelism: usize,
    structure: StructureIdentity,
    data: DataIdentity,
}

impl Clone for RawTable {
    fn clone(&self) -> Self {
        Self {
            columns: Arc::clone(&self.columns),
            string_header: self.string_header.clone(),
            shared: self.shared.clone(),
            fully_shared: true,
            empty_rows: self.empty_rows,
            max_parallelism: self.max_parallelism,
            structure: self.structure,
            data: self.data,
        }
    }
}

impl Default for RawTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RawTable {
    pub fn new() -> Self {
        Self {
            columns: Arc::new(ColumnMap::new()),
            string_header: ColumnHeader::new(),
            shared: ColumnHeader::new(),
            fully_shared: false,
            empty_rows: 0,
            max_parallelism: hardware_parallelism(),
            structure: StructureIdentity::random(),
            data: DataIdentity::random(),
        }
    }

    /// A fresh, unshared table over `columns`.
    pub(crate) fn from_columns(
        columns: ColumnMap,
        string_header: ColumnHeader,
        max_parallelism: usize,
        rows: usize,
    ) -> Self {
        Self {
            columns: Arc::new(columns),
            string_header,
            shared: ColumnHeader::new(),
            fully_shared: false,
            empty_rows: rows,
            max_parallelism,
            structure: StructureIdentity::random(),
            data: DataIdentity::random(),
        }
    }

    /// A table over a new mapping whose columns alias this table's arrays.
    pub(crate) fn derive_with(&self, columns: ColumnMap, shared: ColumnHeader) -> Self {
        let string_header = self
            .string_header
            .iter()
            .filter(|name| columns.contains_key(name.as_str()))
            .cloned()
            .collect();
        Self {
            columns: Arc::new(columns),
            string_header,
            shared,
            fully_shared: false,
            empty_rows: self.num_allocated_rows(),
            max_parallelism: self.max_parallelism,
            structure: StructureIdentity::random(),
            data: self.data,
        }
    }

    /// Common length of the column arrays.
    ///
    /// Not meaningful on a table still being built, where columns may differ
    /// in length.
    pub fn num_allocated_rows(&self) -> usize {
        self.columns
            .values()
            .next()
            .map(Column::len)
            .unwrap_or(self.empty_rows)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.columns.get(name).map(Column::kind)
    }

    pub fn is_string_column(&self, name: &str) -> bool {
        self.string_header.contains(name)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    fn header_of(&self, kind: ColumnKind) -> ColumnHeader {
        self.columns
            .iter()
            .filter(|(_, col)| col.kind() == kind)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn float_header(&self) -> ColumnHeader {
        self.header_of(ColumnKind::Float)
    }

    pub fn int_header(&self) -> ColumnHeader {
        self.header_of(ColumnKind::Int)
    }

    pub fn bool_header(&self) -> ColumnHeader {
        self.header_of(ColumnKind::Bool)
    }

    /// Object columns, string columns included.
    pub fn object_header(&self) -> ColumnHeader {
        self.header_of(ColumnKind::Object)
    }

    pub fn string_header(&self) -> ColumnHeader {
        self.string_header.clone()
    }

    pub fn header(&self) -> ColumnHeader {
        self.columns.keys().cloned().collect()
    }

    /// Columns whose arrays may be aliased by another table.
    pub fn shared_columns(&self) -> &ColumnHeader {
        &self.shared
    }

    /// Whether the column mapping itself is aliased by another table.
    pub fn is_fully_shared(&self) -> bool {
        self.fully_shared
    }

    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    /// Caps the number of workers used by this table and the tables derived
    /// from it. `0`, or anything above the hardware parallelism, means the
    /// hardware parallelism.
    pub fn set_max_parallelism(&mut self, max_parallelism: usize) {
        let hardware = hardware_parallelism();
        self.max_parallelism = if max_parallelism == 0 || max_parallelism >= hardware {
            hardware
        } else {
            max_parallelism
        };
    }

    /// Advisory `(structure, data)` tags; see [`crate::identity`].
    pub fn identity(&self) -> (StructureIdentity, DataIdentity) {
        (self.structure, self.data)
    }

    pub(crate) fn set_data_identity(&mut self, data: DataIdentity) {
        self.data = data;
    }

    /// Queue over `names` sized by this table's parallelism budget.
    pub fn create_column_queue<S: AsRef<str>>(&self, names: &[S]) -> ColumnQueue {
        ColumnQueue::new(names.iter().map(|n| n.as_ref()), self.max_parallelism)
    }

    pub(crate) fn column(&self, name: &str) -> FrameResult<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_owned()))
    }

    pub(crate) fn expect_kind(&self, name: &str, expected: ColumnKind) -> FrameResult<()> {
        let actual = self.column(name)?.kind();
        if actual != expected {
            return Err(FrameError::ColumnTypeMismatch {
                column: name.to_owned(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Gives this table its own column mapping if the current one is aliased.
    /// Every column then counts as shared, since its array still is.
    pub(crate) fn ensure_owned_map(&mut self) {
        if !self.fully_shared && Arc::strong_count(&self.columns) == 1 {
            return;
        }
        let columns: ColumnMap = (*self.columns).clone();
        self.shared.extend(columns.keys().cloned());
        self.columns = Arc::new(columns);
        self.fully_shared = false;
        log::trace!(
            "reallocated column mapping ({} columns, structure {})",
            self.columns.len(),
            self.structure
        );
    }

    fn columns_mut(&mut self) -> &mut ColumnMap {
        // Remember the row count in case the last column goes away.
        self.empty_rows = self.num_allocated_rows();
        self.ensure_owned_map();
        Arc::make_mut(&mut self.columns)
    }

    /// Exclusive access to a column's array, copying it first if it is
    /// aliased anywhere.
    pub(crate) fn column_mut(&mut self, name: &str) -> FrameResult<&mut Column> {
        if !self.contains(name) {
            return Err(FrameError::UnknownColumn(name.to_owned()));
        }
        self.ensure_owned_map();
        self.shared.remove(name);
        let column = Arc::make_mut(&mut self.columns)
            .get_mut(name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_owned()))?;
        if column.make_unique() {
            log::trace!("copy-on-write: detached column {name}");
        }
        Ok(column)
    }

    pub(crate) fn insert_column(&mut self, name: &str, column: Column, is_string: bool) {
        self.columns_mut().insert(name.to_owned(), column);
        self.shared.remove(name);
        if is_string {
            self.string_header.insert(name);
        } else {
            self.string_header.remove(name);
        }
        self.structure = StructureIdentity::random();
    }

    fn alloc<S: AsRef<str>>(
        &mut self,
        kind: ColumnKind,
        names: &[S],
        strings: bool,
    ) -> FrameResult<()> {
        for name in names {
            let name = name.as_ref();
            if let Some(actual) = self.column_kind(name) {
                if actual != kind {
                    return Err(FrameError::ColumnTypeMismatch {
                        column: name.to_owned(),
                        expected: kind,
                        actual,
                    });
                }
            }
        }
        if names.is_empty() {
            return Ok(());
        }
        let rows = self.num_allocated_rows();
        for name in names {
            self.insert_column(name.as_ref(), Column::zeroed(kind, rows), strings);
        }
        Ok(())
    }

    /// Adds zero-filled float columns. An existing float column of the same
    /// name is replaced; an existing column of another type is an error.
    pub fn alloc_floats<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.alloc(ColumnKind::Float, names, false)
    }

    pub fn alloc_ints<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.alloc(ColumnKind::Int, names, false)
    }

    pub fn alloc_bools<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.alloc(ColumnKind::Bool, names, false)
    }

    /// Adds object columns filled with missing values.
    pub fn alloc_objects<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.alloc(ColumnKind::Object, names, false)
    }

    /// Adds object columns marked as string columns.
    pub fn alloc_strings<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        self.alloc(ColumnKind::Object, names, true)
    }

    /// Removes the given columns. Unknown names are ignored.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        if !names.iter().any(|n| self.contains(n.as_ref())) {
            return;
        }
        let columns = self.columns_mut();
        for name in names {
            columns.shift_remove(name.as_ref());
        }
        for name in names {
            self.shared.remove(name.as_ref());
            self.string_header.remove(name.as_ref());
        }
        self.structure = StructureIdentity::random();
    }

    /// Renames a column, keeping its type, position and data.
    pub fn rename(&mut self, old: &str, new: &str) -> FrameResult<()> {
        if !self.contains(old) {
            return Err(FrameError::UnknownColumn(old.to_owned()));
        }
        if old == new {
            return Ok(());
        }
        if self.contains(new) {
            return Err(FrameError::DuplicateColumn(new.to_owned()));
        }
        let columns = self.columns_mut();
        if let Some((idx, _, column)) = columns.shift_remove_full(old) {
            columns.shift_insert(idx, new.to_owned(), column);
        }
        if self.string_header.remove(old) {
            self.string_header.insert(new);
        }
        if self.shared.remove(old) {
            self.shared.insert(new);
        }
        self.structure = StructureIdentity::random();
        Ok(())
    }

    /// Copies the arrays of the given shared columns so they can be mutated
    /// without affecting any other table. An empty `names` means every
    /// column. Columns that are not shared are left alone.
    pub fn unshare<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        for name in names {
            self.column(name.as_ref())?;
        }
        if names.is_empty() {
            self.unshare_all();
        } else {
            self.unshare_columns(names.iter().map(|n| n.as_ref().to_owned()).collect());
        }
        Ok(())
    }

    /// Copies the arrays of every shared column.
    pub fn unshare_all(&mut self) {
        let targets = self.column_names();
        self.unshare_columns(targets);
    }

    /// `targets` must name existing columns.
    fn unshare_columns(&mut self, targets: Vec<String>) {
        if !self.fully_shared && self.shared.is_empty() && Arc::strong_count(&self.columns) == 1 {
            return;
        }
        let everything = targets.len() >= self.num_columns()
            && self.columns.keys().all(|k| targets.contains(k));

        self.ensure_owned_map();
        let columns = Arc::make_mut(&mut self.columns);
        let mut copied = 0usize;
        for name in &targets {
            self.shared.remove(name);
            if let Some(column) = columns.get_mut(name.as_str()) {
                if column.make_unique() {
                    copied += 1;
                }
            }
        }

        self.data = if everything {
            DataIdentity::random()
        } else {
            self.data.union(DataIdentity::random())
        };
        log::debug!(
            "unshare: copied {copied} of {} requested columns (data {})",
            targets.len(),
            self.data
        );
    }

    /// Adds every column of `other` to this table by reference.
    ///
    /// The transferred columns alias `other`'s arrays and are marked shared.
    /// A column with the same name is replaced. Both tables must have the
    /// same number of physical rows unless one of them has no columns.
    pub fn transfer_from(&mut self, other: &RawTable) -> FrameResult<()> {
        if self.num_columns() > 0 && other.num_columns() > 0 {
            let expected = self.num_allocated_rows();
            if let Some((name, col)) = other.columns.iter().find(|(_, c)| c.len() != expected) {
                return Err(FrameError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected,
                    actual: col.len(),
                });
            }
        }

        if self.num_columns() == 0 {
            self.data = other.data;
            self.empty_rows = other.num_allocated_rows();
        } else {
            self.data = self.data.union(other.data);
        }

        let columns = self.columns_mut();
        for (name, column) in other.columns.iter() {
            columns.insert(name.clone(), column.clone());
        }
        for name in other.columns.keys() {
            self.shared.insert(name.clone());
            if other.string_header.contains(name) {
                self.string_header.insert(name.clone());
            } else {
                self.string_header.remove(name);
            }
        }
        self.structure = StructureIdentity::random();
        Ok(())
    }

    /// Converts integer columns to float columns over the whole physical
    /// array. Missing values (`-1`) become `-1.0`.
    pub fn int_to_float<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        for name in names {
            self.expect_kind(name.as_ref(), ColumnKind::Int)?;
        }
        self.convert_to_float(names, |col| match col {
            Column::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            _ => None,
        });
        Ok(())
    }

    /// Converts boolean columns to float columns (`1.0`/`0.0`) over the whole
    /// physical array.
    pub fn bool_to_float<S: AsRef<str>>(&mut self, names: &[S]) -> FrameResult<()> {
        for name in names {
            self.expect_kind(name.as_ref(), ColumnKind::Bool)?;
        }
        self.convert_to_float(names, |col| match col {
            Column::Bool(v) => Some(v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect()),
            _ => None,
        });
        Ok(())
    }

    fn convert_to_float<S, F>(&mut self, names: &[S], convert: F)
    where
        S: AsRef<str>,
        F: Fn(&Column) -> Option<Vec<f64>>,
    {
        if names.is_empty() {
            return;
        }
        let columns = self.columns_mut();
        for name in names {
            if let Some(column) = columns.get_mut(name.as_ref()) {
                if let Some(values) = convert(column) {
                    *column = Column::Float(Arc::new(values));
                }
            }
        }
        for name in names {
            self.shared.remove(name.as_ref());
        }
        self.structure = StructureIdentity::random();
    }

    /// Verifies the structural invariants: equal column lengths, string
    /// columns being object columns holding only strings or missing entries,
    /// and (defensively) no strings in object columns that are not marked as
    /// string columns.
    pub fn check_consistency(&self) -> FrameResult<()> {
        let rows = self.num_allocated_rows();
        for (name, column) in self.columns.iter() {
            if column.len() != rows {
                return Err(FrameError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected: rows,
                    actual: column.len(),
                });
            }
        }
        for name in &self.string_header {
            if self.column_kind(name) != Some(ColumnKind::Object) {
                return Err(FrameError::Inconsistent(format!(
                    "string column {name} is not an object column"
                )));
            }
        }
        for (name, column) in self.columns.iter() {
            let Some(values) = column.as_object() else {
                continue;
            };
            if self.string_header.contains(name) {
                if let Some(row) = first_non_string(values) {
                    return Err(FrameError::UnexpectedObject {
                        column: name.clone(),
                        row,
                    });
                }
            } else if let Some(row) = values.iter().position(|v| matches!(v, Some(Object::String(_)))) {
                return Err(FrameError::Inconsistent(format!(
                    "string at row {row} of non-string column {name}"
                )));
            }
        }
        Ok(())
    }

    /// Physical contents of a float column.
    pub fn float_values(&self, name: &str) -> FrameResult<&[f64]> {
        match self.column(name)? {
            Column::Float(v) => Ok(v.as_slice()),
            other => Err(mismatch(name, ColumnKind::Float, other.kind())),
        }
    }

    pub fn int_values(&self, name: &str) -> FrameResult<&[i64]> {
        match self.column(name)? {
            Column::Int(v) => Ok(v.as_slice()),
            other => Err(mismatch(name, ColumnKind::Int, other.kind())),
        }
    }

    pub fn bool_values(&self, name: &str) -> FrameResult<&[bool]> {
        match self.column(name)? {
            Column::Bool(v) => Ok(v.as_slice()),
            other => Err(mismatch(name, ColumnKind::Bool, other.kind())),
        }
    }

    pub fn object_values(&self, name: &str) -> FrameResult<&[Option<Object>]> {
        match self.column(name)? {
            Column::Object(v) => Ok(v.as_slice()),
            other => Err(mismatch(name, ColumnKind::Object, other.kind())),
        }
    }

    pub(crate) fn float_values_mut(&mut self, name: &str) -> FrameResult<&mut [f64]> {
        self.expect_kind(name, ColumnKind::Float)?;
        match self.column_mut(name)? {
            Column::Float(v) => Ok(Arc::make_mut(v).as_mut_slice()),
            other => Err(mismatch(name, ColumnKind::Float, other.kind())),
        }
    }

    pub(crate) fn int_values_mut(&mut self, name: &str) -> FrameResult<&mut [i64]> {
        self.expect_kind(name, ColumnKind::Int)?;
        match self.column_mut(name)? {
            Column::Int(v) => Ok(Arc::make_mut(v).as_mut_slice()),
            other => Err(mismatch(name, ColumnKind::Int, other.kind())),
        }
    }

    pub(crate) fn bool_values_mut(&mut self, name: &str) -> FrameResult<&mut [bool]> {
        self.expect_kind(name, ColumnKind::Bool)?;
        match self.column_mut(name)? {
            Column::Bool(v) => Ok(Arc::make_mut(v).as_mut_slice()),
            other => Err(mismatch(name, ColumnKind::Bool, other.kind())),
        }
    }

    pub(crate) fn object_values_mut(&mut self, name: &str) -> FrameResult<&mut [Option<Object>]> {
        self.expect_kind(name, ColumnKind::Object)?;
        match self.column_mut(name)? {
            Column::Object(v) => Ok(Arc::make_mut(v).as_mut_slice()),
            other => Err(mismatch(name, ColumnKind::Object, other.kind())),
        }
    }

    /// Concatenates tables row-wise. All tables must have the same columns
    /// with the same types. The data is always copied.
    pub fn merge_rows(tables: &[&RawTable]) -> FrameResult<RawTable> {
        let Some(first) = tables.first() else {
            return Ok(RawTable::new());
        };
        for (k, table) in tables.iter().enumerate().skip(1) {
            check_same_columns(first, table, k)?;
        }

        let total: usize = tables.iter().map(|t| t.num_allocated_rows()).sum();
        let mut columns = ColumnMap::with_capacity(first.num_columns());
        for (name, column) in first.columns.iter() {
            let mut merged = Column::empty(column.kind());
            merged.reserve(total);
            columns.insert(name.clone(), merged);
        }
        for table in tables {
            for (name, merged) in columns.iter_mut() {
                merged.append(table.column(name)?);
            }
        }

        let string_header = tables
            .iter()
            .fold(ColumnHeader::new(), |acc, t| acc.and(&t.string_header));
        Ok(RawTable::from_columns(
            columns,
            string_header,
            first.max_parallelism,
            total,
        ))
    }

    /// Combines the columns of several tables by reference. Every table must
    /// have the same number of physical rows and no column may appear twice.
    pub fn merge_columns(tables: &[&RawTable]) -> FrameResult<RawTable> {
        let mut result = RawTable::new();
        let Some(first) = tables.first() else {
            return Ok(result);
        };
        let expected = first.num_allocated_rows();
        let mut seen = ColumnHeader::new();
        for (k, table) in tables.iter().enumerate() {
            let actual = table.num_allocated_rows();
            if actual != expected {
                return Err(FrameError::RowCountMismatch {
                    table: k,
                    expected,
                    actual,
                });
            }
            for name in table.columns.keys() {
                if !seen.insert(name.clone()) {
                    return Err(FrameError::ColumnOverlap {
                        column: name.clone(),
                        table: k,
                    });
                }
            }
        }
        for table in tables {
            result.transfer_from(table)?;
            result.max_parallelism = table.max_parallelism;
        }
        Ok(result)
    }

    /// Promotes the table to a [`Table`] whose row index is the identity.
    pub fn into_table(self) -> FrameResult<Table> {
        if let Some(first) = self.columns.values().next() {
            let expected = first.len();
            if let Some((name, col)) = self.columns.iter().find(|(_, c)| c.len() != expected) {
                return Err(FrameError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected,
                    actual: col.len(),
                });
            }
        }
        Ok(Table::from_raw(self))
    }
}

/// Physical row of the first entry that is neither missing nor a string.
pub(crate) fn first_non_string(values: &[Option<Object>]) -> Option<usize> {
    values
        .iter()
        .position(|v| matches!(v, Some(object) if !object.is_string()))
}

fn mismatch(name: &str, expected: ColumnKind, actual: ColumnKind) -> FrameError {
    FrameError::ColumnTypeMismatch {
        column: name.to_owned(),
        expected,
        actual,
    }
}

fn check_same_columns(first: &RawTable, other: &RawTable, table: usize) -> FrameResult<()> {
    for (name, column) in first.columns.iter() {
        match other.column_kind(name) {
            None => {
                return Err(FrameError::MissingColumn {
                    column: name.clone(),
                    table,
                })
            }
            Some(actual) if actual != column.kind() => {
                return Err(mismatch(name, column.kind(), actual));
            }
            Some(_) => {}
        }
    }
    if other.num_columns() != first.num_columns() {
        return Err(FrameError::ColumnSetMismatch { table });
    }
    Ok(())
}
