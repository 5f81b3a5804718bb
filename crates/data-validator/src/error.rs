//! Validation Error Types

use sensor_table::ColumnKind;
use thiserror::Error;

/// Schema errors found while checking a table against column contracts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Column is stored as something other than floating point
    #[error("{column} column failed with a check that the data is a float")]
    NotFloat { column: String, kind: ColumnKind },

    /// Normalized signal outside its allowed range
    #[error("{column} column failed with a check that the data is a float between {min:.1} and {max:.1}")]
    FractionOutOfRange {
        column: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Missing required column
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

impl ValidationError {
    /// Name of the offending column
    pub fn column(&self) -> &str {
        match self {
            ValidationError::NotFloat { column, .. } => column,
            ValidationError::FractionOutOfRange { column, .. } => column,
            ValidationError::MissingColumn(column) => column,
        }
    }

    /// Whether this is a data type error (wrong storage type or range)
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ValidationError::NotFloat { .. } | ValidationError::FractionOutOfRange { .. }
        )
    }
}
