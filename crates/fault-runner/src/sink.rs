//! Downstream report sinks.
//!
//! A sink turns a flagged table into an artifact at a path. Report layout
//! and plotting live outside this workspace; they implement [`ReportSink`].
//! Every sink must accept a flag column that is all zeros.

use crate::error::SinkError;
use sensor_table::{ColumnData, SensorTable};
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Consumer of rule output
pub trait ReportSink {
    /// Render `table` to `output`. When `flag_column` is `None` the sink
    /// picks the first column ending in `_flag`.
    fn render(
        &self,
        output: &Path,
        table: &SensorTable,
        flag_column: Option<&str>,
    ) -> Result<(), SinkError>;

    /// File extension of the artifacts this sink writes
    fn extension(&self) -> &'static str;
}

/// Resolve the flag column a sink should report on
pub fn resolve_flag_column<'a>(
    table: &'a SensorTable,
    flag_column: Option<&'a str>,
) -> Result<&'a str, SinkError> {
    match flag_column {
        Some(name) if table.has_column(name) => Ok(name),
        Some(name) => Err(SinkError::MissingFlagColumn(name.to_string())),
        None => table
            .column_names()
            .find(|name| name.ends_with("_flag"))
            .ok_or_else(|| SinkError::MissingFlagColumn("*_flag".to_string())),
    }
}

/// Writes one JSON object per row: `{"timestamp": ..., "<column>": value, ...}`
#[derive(Debug, Clone, Default)]
pub struct JsonLinesSink {
    /// Only write rows whose flag is set
    pub only_flagged: bool,
}

impl JsonLinesSink {
    fn row(table: &SensorTable, row: usize) -> Value {
        let mut object = Map::new();
        object.insert(
            "timestamp".to_string(),
            Value::String(table.index()[row].to_rfc3339()),
        );
        for column in table.columns() {
            let value = match &column.data {
                ColumnData::Int(values) => Value::from(values[row]),
                ColumnData::Bool(values) => Value::Bool(values[row]),
                // NaN samples become null
                ColumnData::Float(values) => Number::from_f64(values[row])
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            };
            object.insert(column.name.clone(), value);
        }
        Value::Object(object)
    }
}

impl ReportSink for JsonLinesSink {
    fn render(
        &self,
        output: &Path,
        table: &SensorTable,
        flag_column: Option<&str>,
    ) -> Result<(), SinkError> {
        let flag_name = resolve_flag_column(table, flag_column)?;
        let flags = table.column(flag_name).map_err(|_| SinkError::MissingFlagColumn(flag_name.to_string()))?;

        let mut writer = BufWriter::new(File::create(output)?);
        let mut written = 0usize;
        for row in 0..table.len() {
            let flagged = flags.value_f64(row) == Some(1.0);
            if self.only_flagged && !flagged {
                continue;
            }
            serde_json::to_writer(&mut writer, &Self::row(table, row))?;
            writer.write_all(b"\n")?;
            written += 1;
        }
        writer.flush()?;

        info!(
            "Wrote {} row(s) to {} (flag column {})",
            written,
            output.display(),
            flag_name
        );
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "jsonl"
    }
}
