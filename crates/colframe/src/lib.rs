//! In-memory column-oriented tables with zero-copy views.
//!
//! This crate focuses on:
//! - Typed column storage (float, int, bool, generic objects and strings) in a [`RawTable`].
//! - A view algebra on [`Table`] (index, slice, mask, column projection, shuffle, sample,
//!   split, sort, top-n) that never copies column data.
//! - Copy-on-write sharing: views alias their parent's arrays, and a write through any table
//!   first copies whatever array is still aliased.
//! - Typed accessors, row iterators and dense batches for numeric consumers.
//! - Column-wise parallel work through [`colframe_work::ColumnQueue`].
//!
//! Missing values are `-1` in integer columns, `NaN` in float columns and `None` in object
//! columns.

#![forbid(unsafe_code)]

mod access;
mod batching;
mod builder;
mod column;
mod concat;
mod conversions;
mod error;
mod hashing;
pub mod identity;
mod header;
mod inplace;
mod iter;
mod raw;
mod row_index;
mod table;
mod view;

pub use crate::access::{
    BoolAccess, BoolAccessMut, ColumnAccess, ColumnAccessMut, FloatAccess, FloatAccessMut,
    IntAccess, IntAccessMut, ObjectAccess, ObjectAccessMut, StringAccess, StringAccessMut,
};
pub use crate::batching::{DenseBatch, DenseBatcher};
pub use crate::builder::TableBuilder;
pub use crate::column::{ColumnKind, Object, ObjectType, MISSING_INT};
pub use crate::concat::{
    check_no_column_overlap, column_concat_view, column_copy_concat, column_smart_concat,
    row_concat,
};
pub use crate::error::{FrameError, FrameResult};
pub use crate::hashing::hash_string;
pub use crate::header::ColumnHeader;
pub use crate::iter::{Element, Float32Iterator, Float64Iterator, Row, RowIterator, BLOCK_ROWS};
pub use crate::raw::RawTable;
pub use crate::row_index::RowIndex;
pub use crate::table::{Mask, Table, TableOptions};

pub use colframe_work::{ColumnQueue, ProcessedJob};
