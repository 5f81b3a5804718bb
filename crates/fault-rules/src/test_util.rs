//! Test helpers for building sensor tables.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sensor_table::{ColumnData, SensorTable};

pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
}

/// One-minute table built from `(name, values)` float columns.
pub(crate) fn float_table(columns: &[(&str, Vec<f64>)]) -> SensorTable {
    let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
    let mut table = SensorTable::with_regular_index(start(), Duration::minutes(1), rows).unwrap();
    for (name, values) in columns {
        table
            .insert_column(*name, ColumnData::Float(values.clone()))
            .unwrap();
    }
    table
}

pub(crate) fn flag_sum(table: &SensorTable, column: &str) -> i64 {
    table.int_column(column).unwrap().iter().sum()
}
