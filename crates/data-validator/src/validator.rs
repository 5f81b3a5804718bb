//! Column Contract Validator

use crate::error::ValidationError;
use sensor_table::{SensorTable, TableError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a rule expects from one of its input columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    /// Any floating point value (temperatures, pressures, airflow)
    Float,
    /// Floating point normalized signal (fan speed, damper, valve command)
    Fraction,
}

/// A column name paired with the check it must pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnContract {
    pub name: String,
    pub kind: ContractKind,
}

impl ColumnContract {
    pub fn float(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ContractKind::Float,
        }
    }

    pub fn fraction(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ContractKind::Fraction,
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Valid range for normalized signals
    pub fraction_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fraction_range: (0.0, 1.0),
        }
    }
}

/// Result of checking every contract without stopping at the first failure
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all columns passed
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of columns checked
    pub columns_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(columns_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            columns_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, columns_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            columns_checked,
        }
    }
}

/// Checks sensor tables against rule column contracts
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check that a column exists and is stored as floating point
    pub fn validate_float<'a>(
        &self,
        table: &'a SensorTable,
        column: &str,
    ) -> Result<&'a [f64], ValidationError> {
        let data = table.column(column).map_err(|err| match err {
            TableError::MissingColumn(name) => ValidationError::MissingColumn(name),
            _ => ValidationError::MissingColumn(column.to_string()),
        })?;
        data.as_float().ok_or_else(|| ValidationError::NotFloat {
            column: column.to_string(),
            kind: data.kind(),
        })
    }

    /// Check every value against a range; NaN samples are treated as missing, not out of range
    pub fn validate_range(
        &self,
        column: &str,
        values: &[f64],
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        match values.iter().find(|&&v| v < range.0 || v > range.1) {
            Some(&value) => Err(ValidationError::FractionOutOfRange {
                column: column.to_string(),
                value,
                min: range.0,
                max: range.1,
            }),
            None => Ok(()),
        }
    }

    /// Check a single contract
    pub fn validate_contract(
        &self,
        table: &SensorTable,
        contract: &ColumnContract,
    ) -> Result<(), ValidationError> {
        let values = self.validate_float(table, &contract.name)?;
        if contract.kind == ContractKind::Fraction {
            self.validate_range(&contract.name, values, self.config.fraction_range)?;
        }
        Ok(())
    }

    /// Check contracts in order, failing on the first violation
    pub fn validate(
        &self,
        table: &SensorTable,
        contracts: &[ColumnContract],
    ) -> Result<(), ValidationError> {
        for contract in contracts {
            if let Err(err) = self.validate_contract(table, contract) {
                warn!("Input rejected: {}", err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Check all contracts and collect every violation
    pub fn check_all(&self, table: &SensorTable, contracts: &[ColumnContract]) -> ValidationResult {
        let errors: Vec<ValidationError> = contracts
            .iter()
            .filter_map(|c| self.validate_contract(table, c).err())
            .collect();
        if errors.is_empty() {
            ValidationResult::valid(contracts.len())
        } else {
            ValidationResult::invalid(errors, contracts.len())
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
