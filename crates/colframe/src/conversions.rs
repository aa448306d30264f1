use indexmap::IndexMap;

use crate::column::{Column, Object, MISSING_INT};
use crate::error::{FrameError, FrameResult};
use crate::table::Table;

impl Table {
    /// Copies the current rows of any column into generic values.
    pub fn copy_values_to_objects(&self, name: &str) -> FrameResult<Vec<Option<Object>>> {
        let rows = self.rows.iter();
        let values: Vec<Option<Object>> = match self.raw.column(name)? {
            Column::Float(v) => rows.map(|p| Some(Object::Float(v[p]))).collect(),
            Column::Int(v) => rows.map(|p| Some(Object::Int(v[p]))).collect(),
            Column::Bool(v) => rows.map(|p| Some(Object::Bool(v[p]))).collect(),
            Column::Object(v) => rows.map(|p| v[p].clone()).collect(),
        };
        Ok(values)
    }

    /// Maps the labels of a string column to `0, 1, 2, ...` in order of first
    /// appearance. Returns the ordinals for the current rows and the mapping;
    /// missing labels become `-1`.
    ///
    /// `["a", "b", "a", "c"]` gives `[0, 1, 0, 2]` with `a: 0, b: 1, c: 2`.
    pub fn label_to_int(&self, name: &str) -> FrameResult<(Vec<i64>, IndexMap<String, i64>)> {
        self.check_string_column(name)?;
        let values = self.raw.object_values(name)?;
        let mut mapping: IndexMap<String, i64> = IndexMap::new();
        let mut ordinals = Vec::with_capacity(self.num_rows());
        for p in self.rows.iter() {
            let ordinal = match &values[p] {
                None => MISSING_INT,
                Some(Object::String(label)) => match mapping.get(label.as_ref()) {
                    Some(&ordinal) => ordinal,
                    None => {
                        let ordinal = mapping.len() as i64;
                        mapping.insert(label.to_string(), ordinal);
                        ordinal
                    }
                },
                Some(_) => {
                    return Err(FrameError::UnexpectedObject {
                        column: name.to_owned(),
                        row: p,
                    })
                }
            };
            ordinals.push(ordinal);
        }
        Ok((ordinals, mapping))
    }
}
