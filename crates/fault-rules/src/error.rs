//! Rule Error Types

use data_validator::ValidationError;
use sensor_table::TableError;
use thiserror::Error;

/// Invalid rule configuration, reported once at construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Threshold is negative or not finite
    #[error("{field} must be a finite, non-negative number, got {value}")]
    InvalidThreshold { field: &'static str, value: f64 },

    /// Normalized setpoint outside [0, 1]
    #[error("{field} must be between 0.0 and 1.0, got {value}")]
    InvalidFraction { field: &'static str, value: f64 },

    /// Column binding left empty
    #[error("Column binding {0} is empty")]
    EmptyColumn(&'static str),

    /// Persistence window of zero rows
    #[error("rolling_window_size must be at least 1, got {0}")]
    InvalidWindow(usize),

    /// Time bucket of zero width
    #[error("Time bucket width must be positive")]
    InvalidBucket,
}

/// Errors returned by [`crate::FaultRule::apply`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// Input failed a column contract
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Output table could not be assembled
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Rule built from an invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Resampled bucket start not representable as a timestamp
    #[error("Bucket starting {0}s after the epoch is out of range")]
    BucketOutOfRange(i64),

    /// Index spans more resampling buckets than a single table may hold
    #[error("Index spans {buckets} buckets, at most {max} allowed")]
    TooManyBuckets { buckets: u64, max: u64 },
}

impl RuleError {
    /// Whether this is a schema (data type) error in the caller's input
    pub fn is_type_error(&self) -> bool {
        matches!(self, RuleError::Validation(e) if e.is_type_error())
    }
}

/// Check that a threshold is finite and non-negative
pub(crate) fn check_threshold(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { field, value })
    }
}

/// Check that a normalized setpoint lies in [0, 1]
pub(crate) fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidFraction { field, value })
    }
}

pub(crate) fn check_column(field: &'static str, column: &str) -> Result<(), ConfigError> {
    if column.trim().is_empty() {
        Err(ConfigError::EmptyColumn(field))
    } else {
        Ok(())
    }
}

pub(crate) fn check_window(window: usize) -> Result<(), ConfigError> {
    if window == 0 {
        Err(ConfigError::InvalidWindow(window))
    } else {
        Ok(())
    }
}
