//! Typed Table Columns

use serde::{Deserialize, Serialize};

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// 64-bit floating point samples
    Float,
    /// Integer samples (counts, 0/1 flags, or mis-typed sensor exports)
    Int,
    /// Boolean samples
    Bool,
}

/// Column values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
}

impl ColumnData {
    /// Number of values
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
        }
    }

    /// Check if the column holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage type
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Int(_) => ColumnKind::Int,
            ColumnData::Bool(_) => ColumnKind::Bool,
        }
    }

    /// Borrow the values if this is a float column
    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the values if this is an integer column
    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            ColumnData::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Value at `row` widened to f64 (booleans become 0.0 / 1.0)
    pub fn value_f64(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Float(v) => v.get(row).copied(),
            ColumnData::Int(v) => v.get(row).map(|&x| x as f64),
            ColumnData::Bool(v) => v.get(row).map(|&b| if b { 1.0 } else { 0.0 }),
        }
    }

    /// Build a 0/1 integer column from boolean outcomes
    pub fn flags(values: impl IntoIterator<Item = bool>) -> Self {
        ColumnData::Int(values.into_iter().map(i64::from).collect())
    }
}

/// Named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}
