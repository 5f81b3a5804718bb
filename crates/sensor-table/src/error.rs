//! Table Error Types

use crate::column::ColumnKind;
use thiserror::Error;

/// Errors raised while building or querying a [`crate::SensorTable`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Index is not strictly ascending
    #[error("Timestamp at row {row} is not after the previous row")]
    UnorderedIndex { row: usize },

    /// Regular index runs past the representable timestamp range
    #[error("Timestamp at row {row} is out of range")]
    IndexOverflow { row: usize },

    /// Column length differs from the index length
    #[error("Column {column} has {actual} values, index has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column name already present
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Column name not present
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Column stored with a different type than requested
    #[error("Column {column} is {actual:?}, expected {expected:?}")]
    WrongKind {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },
}
