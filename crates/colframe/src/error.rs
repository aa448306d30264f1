use crate::column::ColumnKind;

pub type FrameResult<T> = Result<T, FrameError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("column {column} is {actual:?}, expected {expected:?}")]
    ColumnTypeMismatch {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },
    #[error("column {0} already exists")]
    DuplicateColumn(String),
    #[error("column {0} is not a string column")]
    NotAStringColumn(String),
    #[error("column {0} is a string column; write it through a string accessor")]
    StringColumn(String),
    #[error("column {0} is not a float, int or bool column")]
    NotNumeric(String),
    #[error("non-string value at physical row {row} of string column {column}")]
    UnexpectedObject { column: String, row: usize },
    #[error("row {index} out of bounds for {len} rows")]
    RowOutOfBounds { index: usize, len: usize },
    #[error("invalid slice [{from}, {to}) over {rows} rows")]
    InvalidSlice { from: isize, to: isize, rows: usize },
    #[error("mask has {actual} entries, expected {expected}")]
    MaskLengthMismatch { expected: usize, actual: usize },
    #[error("{actual} values given for {expected} rows")]
    ValueCountMismatch { expected: usize, actual: usize },
    #[error("batch size must be positive")]
    InvalidBatchSize,
    #[error("cannot sample {requested} rows out of {available}")]
    SampleTooLarge { requested: usize, available: usize },
    #[error("sampling with replacement is not supported")]
    ReplacementSampling,
    #[error("testing ratio {0} is not within [0, 1]")]
    InvalidRatio(f64),
    #[error("column {column} has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("table {table} has {actual} rows, expected {expected}")]
    RowCountMismatch {
        table: usize,
        expected: usize,
        actual: usize,
    },
    #[error("column {column} of table {table} overlaps with a previous table")]
    ColumnOverlap { column: String, table: usize },
    #[error("column {column} is missing from table {table}")]
    MissingColumn { column: String, table: usize },
    #[error("table {table} has columns the first table does not have")]
    ColumnSetMismatch { table: usize },
    #[error("row indices are not compatible; copy the tables before concatenating")]
    IndexMismatch,
    #[error("at least one table is required")]
    EmptyInput,
    #[error("inconsistent table: {0}")]
    Inconsistent(String),
}
