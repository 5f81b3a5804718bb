//! Intermediate-value observers

use crate::rule::FaultCode;
use sensor_table::SensorTable;
use tracing::debug;

/// Receives intermediate tables while a rule runs.
///
/// Rules call this after computing derived values (FC4 per-row modes, FC6
/// airflow fractions, the flagged output) and never otherwise emit them.
pub trait RuleObserver: Send + Sync {
    fn observe(&self, code: FaultCode, stage: &str, table: &SensorTable);
}

/// Observer that logs each stage through `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RuleObserver for TracingObserver {
    fn observe(&self, code: FaultCode, stage: &str, table: &SensorTable) {
        let columns: Vec<&str> = table.column_names().collect();
        debug!(
            rule = %code,
            stage,
            rows = table.len(),
            columns = ?columns,
            "rule stage"
        );
    }
}
