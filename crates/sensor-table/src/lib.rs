//! Sensor Table
//!
//! Provides the time-indexed columnar table that fault rules read from and append to.

mod column;
mod error;
mod table;

pub use column::{Column, ColumnData, ColumnKind};
pub use error::TableError;
pub use table::SensorTable;

/// Timestamp type used for the table index
pub type Timestamp = chrono::DateTime<chrono::Utc>;
