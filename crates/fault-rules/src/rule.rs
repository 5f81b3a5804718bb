//! Fault Rule Trait and Shared Helpers

use crate::error::RuleError;
use crate::observer::RuleObserver;
use data_validator::ColumnContract;
use sensor_table::{ColumnData, SensorTable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Fault condition identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultCode {
    Fc1,
    Fc2,
    Fc3,
    Fc4,
    Fc5,
    Fc6,
    Fc7,
    Fc10,
}

impl FaultCode {
    /// Guideline 36 fault condition number
    pub fn number(&self) -> u8 {
        match self {
            FaultCode::Fc1 => 1,
            FaultCode::Fc2 => 2,
            FaultCode::Fc3 => 3,
            FaultCode::Fc4 => 4,
            FaultCode::Fc5 => 5,
            FaultCode::Fc6 => 6,
            FaultCode::Fc7 => 7,
            FaultCode::Fc10 => 10,
        }
    }

    /// Name of the flag column this rule appends
    pub fn flag_column(&self) -> String {
        format!("fc{}_flag", self.number())
    }

    /// Short description of the fault signature
    pub fn description(&self) -> &'static str {
        match self {
            FaultCode::Fc1 => "Duct static pressure too low with fan at full speed",
            FaultCode::Fc2 => "Mixed air temperature too low versus return and outdoor air",
            FaultCode::Fc3 => "Mixed air temperature too high versus return and outdoor air",
            FaultCode::Fc4 => "Too many operating state changes per interval",
            FaultCode::Fc5 => "Supply air temperature too low given mixing and fan heat",
            FaultCode::Fc6 => "Outdoor air fraction disagrees with minimum airflow setpoint",
            FaultCode::Fc7 => "Supply air temperature too low in full heating",
            FaultCode::Fc10 => "Outdoor and mixed air temperatures disagree in economizer plus mechanical cooling",
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fc{}", self.number())
    }
}

/// A configured fault condition.
///
/// `apply` is a pure function of the input table and the rule's immutable
/// configuration: it validates the declared column contracts, evaluates the
/// fault signature and returns a new table. Row-wise rules return the input
/// columns plus the appended flag and intermediates; FC4 returns one row per
/// time bucket instead.
pub trait FaultRule: Send + Sync {
    /// Which fault condition this rule evaluates
    fn code(&self) -> FaultCode;

    /// Columns the rule reads, with the check each must pass
    fn contracts(&self) -> Vec<ColumnContract>;

    /// Evaluate the rule over a table
    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError>;

    /// Whether the output keeps the input's row index
    fn preserves_rows(&self) -> bool {
        true
    }

    fn flag_column(&self) -> String {
        self.code().flag_column()
    }
}

/// Observer slot shared by every rule
pub(crate) type ObserverSlot = Option<Arc<dyn RuleObserver>>;

pub(crate) fn notify(observer: &ObserverSlot, code: FaultCode, stage: &str, table: &SensorTable) {
    if let Some(observer) = observer {
        observer.observe(code, stage, table);
    }
}

/// Elementwise minimum that propagates NaN, so a missing sample never flags
pub(crate) fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

/// Clone `table` and append the given columns, flag last
pub(crate) fn append_columns(
    table: &SensorTable,
    code: FaultCode,
    intermediates: Vec<(&str, ColumnData)>,
    flags: Vec<bool>,
) -> Result<SensorTable, RuleError> {
    let flagged = flags.iter().filter(|&&f| f).count();
    let mut out = table.clone();
    for (name, data) in intermediates {
        out.insert_column(name, data)?;
    }
    out.insert_column(code.flag_column(), ColumnData::flags(flags))?;
    debug!("{}: {} of {} rows flagged", code, flagged, table.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_column_names() {
        assert_eq!(FaultCode::Fc1.flag_column(), "fc1_flag");
        assert_eq!(FaultCode::Fc10.flag_column(), "fc10_flag");
        assert_eq!(FaultCode::Fc4.to_string(), "fc4");
    }

    #[test]
    fn test_fc10_describes_mechanical_cooling() {
        assert!(FaultCode::Fc10
            .description()
            .ends_with("economizer plus mechanical cooling"));
    }
}
