use std::sync::Arc;

use crate::column::{Column, ColumnKind, Object, ObjectType};
use crate::error::{FrameError, FrameResult};
use crate::raw::RawTable;
use crate::table::Table;

impl Table {
    /// Writes `values[j]` to logical row `j` of `name`, creating the column
    /// if needed. Only the physical rows reachable through the row index
    /// change; the array is copied first if another table aliases it.
    fn overwrite<T, F>(
        &mut self,
        name: &str,
        kind: ColumnKind,
        values: &[T],
        string: bool,
        slot: F,
    ) -> FrameResult<()>
    where
        T: Clone,
        F: for<'r> FnOnce(&'r mut RawTable, &str) -> FrameResult<&'r mut [T]>,
    {
        if values.len() != self.num_rows() {
            return Err(FrameError::ValueCountMismatch {
                expected: self.num_rows(),
                actual: values.len(),
            });
        }
        match self.raw.column_kind(name) {
            Some(actual) if actual != kind => {
                return Err(FrameError::ColumnTypeMismatch {
                    column: name.to_owned(),
                    expected: kind,
                    actual,
                });
            }
            Some(_) => {}
            None => {
                let rows = self.raw.num_allocated_rows();
                self.raw
                    .insert_column(name, Column::zeroed(kind, rows), string);
            }
        }

        let target = slot(&mut self.raw, name)?;
        for (p, value) in self.rows.iter().zip(values) {
            target[p] = value.clone();
        }
        log::trace!("overwrote {} rows of {name}", values.len());
        Ok(())
    }

    pub fn overwrite_floats(&mut self, name: &str, values: &[f64]) -> FrameResult<()> {
        self.overwrite(name, ColumnKind::Float, values, false, RawTable::float_values_mut)
    }

    pub fn overwrite_ints(&mut self, name: &str, values: &[i64]) -> FrameResult<()> {
        self.overwrite(name, ColumnKind::Int, values, false, RawTable::int_values_mut)
    }

    pub fn overwrite_bools(&mut self, name: &str, values: &[bool]) -> FrameResult<()> {
        self.overwrite(name, ColumnKind::Bool, values, false, RawTable::bool_values_mut)
    }

    /// Like [`Table::overwrite_floats`] for a string column; `None` writes the
    /// missing marker. An existing object column must be a string column.
    pub fn overwrite_strings<S: AsRef<str>>(
        &mut self,
        name: &str,
        values: &[Option<S>],
    ) -> FrameResult<()> {
        if self.raw.column_kind(name) == Some(ColumnKind::Object) {
            self.check_string_column(name)?;
        }
        let objects: Vec<Option<Object>> = values
            .iter()
            .map(|v| v.as_ref().map(|s| Object::String(Arc::from(s.as_ref()))))
            .collect();
        self.overwrite(
            name,
            ColumnKind::Object,
            &objects,
            true,
            RawTable::object_values_mut,
        )
    }

    /// Writes generic values. With [`ObjectType::String`] the column is
    /// (or becomes) a string column and every value must be a string or
    /// missing; a string column only ever accepts such values.
    pub fn overwrite_objects(
        &mut self,
        name: &str,
        values: &[Option<Object>],
        object_type: ObjectType,
    ) -> FrameResult<()> {
        let string = object_type == ObjectType::String || self.raw.is_string_column(name);
        if string {
            let bad = values
                .iter()
                .position(|v| matches!(v, Some(object) if !object.is_string()));
            if let Some(row) = bad {
                return Err(FrameError::UnexpectedObject {
                    column: name.to_owned(),
                    row,
                });
            }
        }
        if string && !self.raw.is_string_column(name) {
            self.check_uncovered_strings(name)?;
        }
        self.overwrite(
            name,
            ColumnKind::Object,
            values,
            string,
            RawTable::object_values_mut,
        )?;
        if string {
            self.raw.string_header.insert(name);
        }
        Ok(())
    }

    /// Marking an existing generic column as a string column requires the
    /// physical rows this table cannot reach to hold strings already.
    fn check_uncovered_strings(&self, name: &str) -> FrameResult<()> {
        let Some(Column::Object(existing)) = self.raw.columns.get(name) else {
            return Ok(());
        };
        let mut covered = vec![false; existing.len()];
        for p in self.rows.iter() {
            covered[p] = true;
        }
        let bad = existing
            .iter()
            .zip(&covered)
            .position(|(v, &covered)| !covered && matches!(v, Some(object) if !object.is_string()));
        match bad {
            Some(row) => Err(FrameError::UnexpectedObject {
                column: name.to_owned(),
                row,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableBuilder;

    #[test]
    fn overwrite_goes_through_the_index_and_creates_columns() {
        let table = TableBuilder::new()
            .set_ints("n", vec![0, 1, 2, 3])
            .build()
            .unwrap();
        let mut odd = table.mask_view(&[false, true, false, true]).unwrap();
        odd.overwrite_floats("x", &[1.5, 3.5]).unwrap();
        odd.overwrite_ints("n", &[10, 30]).unwrap();

        assert_eq!(odd.raw().float_values("x").unwrap(), &[0.0, 1.5, 0.0, 3.5]);
        assert_eq!(odd.raw().int_values("n").unwrap(), &[0, 10, 2, 30]);
        assert_eq!(table.raw().int_values("n").unwrap(), &[0, 1, 2, 3]);
        assert!(!table.contains("x"));
    }

    #[test]
    fn overwrite_checks_lengths_and_types() {
        let mut table = TableBuilder::new()
            .set_ints("n", vec![0, 1])
            .build()
            .unwrap();
        assert_eq!(
            table.overwrite_ints("n", &[1]),
            Err(FrameError::ValueCountMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            table.overwrite_floats("n", &[1.0, 2.0]),
            Err(FrameError::ColumnTypeMismatch { .. })
        ));
        assert_eq!(
            table.overwrite_objects("s", &[Some(Object::Int(1)), None], ObjectType::String),
            Err(FrameError::UnexpectedObject {
                column: "s".to_owned(),
                row: 0
            })
        );
        assert!(!table.contains("s"));
    }

    #[test]
    fn overwrite_strings_marks_new_columns() {
        let mut table = TableBuilder::new()
            .set_bools("b", vec![true, false])
            .build()
            .unwrap();
        table
            .overwrite_strings("s", &[Some("x"), None])
            .unwrap();
        assert!(table.is_string_column("s"));
        let strings = table.strings("s").unwrap();
        assert_eq!(strings.get(0), Some("x"));
        assert_eq!(strings.get(1), None);
        table.check_consistency().unwrap();
    }

    #[test]
    fn string_marking_needs_every_physical_row_to_be_a_string() {
        let table = TableBuilder::new()
            .set_objects("o", vec![Some(Object::from("a")), Some(Object::Int(2))])
            .build()
            .unwrap();
        let mut first = table.mask_view(&[true, false]).unwrap();
        assert_eq!(
            first.overwrite_objects("o", &[Some(Object::from("b"))], ObjectType::String),
            Err(FrameError::UnexpectedObject {
                column: "o".to_owned(),
                row: 1
            })
        );
        assert!(!first.is_string_column("o"));
        assert_eq!(first.objects("o").unwrap()[0], Some(Object::from("a")));

        let mut second = table.mask_view(&[false, true]).unwrap();
        second
            .overwrite_objects("o", &[None], ObjectType::String)
            .unwrap();
        assert!(second.is_string_column("o"));
        second.check_consistency().unwrap();
        assert!(!table.is_string_column("o"));
    }
}
