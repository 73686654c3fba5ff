//! Typed cell values and normalized rows.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::input::RawValue;

/// A cell resolved against its column's declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    /// Date-like text, kept verbatim.
    Date(String),
    Boolean(bool),
    /// Null or nested values passed through untouched.
    Unknown(RawValue),
}

impl CellValue {
    /// Numeric value, if this is a number cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text of a string or date cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }
}

impl From<&RawValue> for CellValue {
    /// Pass a raw value through with its own tag.
    fn from(value: &RawValue) -> Self {
        match value {
            RawValue::Text(s) => CellValue::Text(s.clone()),
            RawValue::Number(n) => CellValue::Number(*n),
            RawValue::Bool(b) => CellValue::Boolean(*b),
            other => CellValue::Unknown(other.clone()),
        }
    }
}

impl From<&CellValue> for RawValue {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::Number(n) => RawValue::Number(*n),
            CellValue::Text(s) | CellValue::Date(s) => RawValue::Text(s.clone()),
            CellValue::Boolean(b) => RawValue::Bool(*b),
            CellValue::Unknown(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) | CellValue::Date(s) => f.write_str(s),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// A row with every cell coerced to its column type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    /// 1-based position in the current sequence.
    pub index: usize,
    #[serde(flatten)]
    pub cells: IndexMap<String, CellValue>,
}

impl NormalizedRow {
    pub fn new(index: usize, cells: IndexMap<String, CellValue>) -> Self {
        Self { index, cells }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Numeric value of a column, if it holds a number.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.cells.get(column).and_then(CellValue::as_f64)
    }
}

/// Reassign sequential 1-based indices.
pub fn reindex(rows: &mut [NormalizedRow]) {
    for (i, row) in rows.iter_mut().enumerate() {
        row.index = i + 1;
    }
}
