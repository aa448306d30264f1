//! Work distribution primitives for column-wise table operations.
//!
//! - [`GroupIndexer`] splits `n` elements into contiguous, near-equal ranges.
//! - [`ColumnQueue`] fans per-column work out to a bounded set of workers and
//!   collects exactly one [`ProcessedJob`] per column.

#![forbid(unsafe_code)]

mod group_indexer;
mod pool;
mod queue;

pub use crate::group_indexer::{split_slice, GroupIndexer};
pub use crate::pool::{available_workers, hardware_parallelism};
pub use crate::queue::{first_error, ColumnJobError, ColumnQueue, ProcessedJob};
