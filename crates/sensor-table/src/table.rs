//! Time-Indexed Columnar Table

use crate::column::{Column, ColumnData, ColumnKind};
use crate::error::TableError;
use crate::Timestamp;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Ordered table of named sensor columns sharing one timestamp index.
///
/// The index is strictly ascending and every column carries exactly one
/// value per index row. Both invariants are checked on construction and on
/// every column insertion, so rules can zip columns without bounds checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorTable {
    index: Vec<Timestamp>,
    columns: Vec<Column>,
}

impl SensorTable {
    /// Create an empty-column table over the given index
    pub fn new(index: Vec<Timestamp>) -> Result<Self, TableError> {
        if let Some(row) = index
            .windows(2)
            .position(|pair| pair[1] <= pair[0])
            .map(|i| i + 1)
        {
            return Err(TableError::UnorderedIndex { row });
        }
        Ok(Self {
            index,
            columns: Vec::new(),
        })
    }

    /// Create a table with `rows` timestamps spaced `step` apart
    pub fn with_regular_index(
        start: Timestamp,
        step: Duration,
        rows: usize,
    ) -> Result<Self, TableError> {
        let count = i32::try_from(rows).map_err(|_| TableError::IndexOverflow { row: rows })?;
        let index = (0..count)
            .map(|i| {
                step.checked_mul(i)
                    .and_then(|offset| start.checked_add_signed(offset))
                    .ok_or(TableError::IndexOverflow { row: i as usize })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(index)
    }

    /// Builder-style column insertion
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        data: ColumnData,
    ) -> Result<Self, TableError> {
        self.insert_column(name, data)?;
        Ok(self)
    }

    /// Append a column
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        data: ColumnData,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if data.len() != self.index.len() {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.index.len(),
                actual: data.len(),
            });
        }
        self.columns.push(Column::new(name, data));
        Ok(())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Timestamp index
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    /// All columns in insertion order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&ColumnData, TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.data)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Look up a float column by name
    pub fn float_column(&self, name: &str) -> Result<&[f64], TableError> {
        let data = self.column(name)?;
        data.as_float().ok_or_else(|| TableError::WrongKind {
            column: name.to_string(),
            expected: ColumnKind::Float,
            actual: data.kind(),
        })
    }

    /// Look up an integer column by name
    pub fn int_column(&self, name: &str) -> Result<&[i64], TableError> {
        let data = self.column(name)?;
        data.as_int().ok_or_else(|| TableError::WrongKind {
            column: name.to_string(),
            expected: ColumnKind::Int,
            actual: data.kind(),
        })
    }
}
