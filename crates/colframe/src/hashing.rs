use colframe_work::first_error;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use crate::column::{Column, Object, MISSING_INT};
use crate::error::{FrameError, FrameResult};
use crate::identity::DataIdentity;
use crate::raw::ColumnMap;
use crate::table::Table;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable, non-negative hash of a string (64-bit FNV-1a folded below
/// `i64::MAX`). The same string always hashes to the same value.
pub fn hash_string(value: &str) -> i64 {
    let hash = value.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    // The remainder is below i64::MAX, so the cast is lossless.
    (hash % i64::MAX as u64) as i64
}

fn hash_entry(entry: &Option<Object>) -> i64 {
    match entry {
        Some(Object::String(s)) => hash_string(s),
        // Non-string objects collapse onto the missing marker as well.
        _ => MISSING_INT,
    }
}

impl Table {
    /// Replaces the string columns `names` by integer columns holding
    /// [`hash_string`] of each entry. Missing entries, and entries that are
    /// not strings, become `-1`.
    ///
    /// Only the physical rows reachable through this table's row index are
    /// hashed. Columns are processed concurrently through a
    /// [`colframe_work::ColumnQueue`]. The other columns are shared with the
    /// receiver.
    pub fn hash_strings_view<S: AsRef<str>>(&self, names: &[S]) -> FrameResult<Table> {
        if names.is_empty() {
            return Ok(self.view());
        }
        for name in names {
            let name = name.as_ref();
            self.raw.column(name)?;
            if !self.raw.is_string_column(name) {
                return Err(FrameError::NotAStringColumn(name.to_owned()));
            }
        }

        let allocated = self.raw.num_allocated_rows();
        let positions = self.rows.as_slice();
        let queue = self.raw.create_column_queue(names);
        let workers = queue.workers();
        let jobs = queue.collect(|name| -> Result<Vec<i64>, Infallible> {
            let mut hashed = vec![0; allocated];
            if let Ok(values) = self.raw.object_values(name) {
                for &p in positions {
                    hashed[p] = hash_entry(&values[p]);
                }
            }
            Ok(hashed)
        });
        let mut hashed: HashMap<String, Vec<i64>> =
            first_error(jobs).unwrap_or_else(|err| match err.source {});

        let mut columns = ColumnMap::with_capacity(self.num_columns());
        for (name, column) in self.raw.columns.iter() {
            let column = match hashed.remove(name) {
                Some(values) => Column::Int(Arc::new(values)),
                None => column.clone(),
            };
            columns.insert(name.clone(), column);
        }
        let shared = self.raw.header().except_names(names);
        let replaced_all = shared.is_empty();
        let mut raw = self.raw.derive_with(columns, shared);
        for name in names {
            raw.string_header.remove(name.as_ref());
        }
        let (_, data) = self.raw.identity();
        raw.set_data_identity(if replaced_all {
            DataIdentity::random()
        } else {
            data.union(DataIdentity::random())
        });

        log::debug!(
            "hashed {} string columns over {} rows on {workers} workers",
            names.len(),
            self.num_rows()
        );
        Ok(self.derive(raw, self.rows.clone()))
    }
}
