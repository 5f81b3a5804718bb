//! Data Validation
//!
//! Checks that the columns a fault rule reads are floating point and, for
//! normalized control signals, within [0, 1] before any rule logic runs.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ColumnContract, ContractKind, ValidationConfig, ValidationResult, Validator};
