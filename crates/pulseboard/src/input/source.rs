//! Raw tabular data and source metadata.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::format::InputFormat;

/// A loosely-typed cell value as produced by a format parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Nested JSON array or object.
    Json(serde_json::Value),
}

impl RawValue {
    /// The empty-string value used for absent cells.
    pub fn empty() -> Self {
        RawValue::Text(String::new())
    }

    /// Convert a JSON value into a raw cell.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            Value::String(s) => RawValue::Text(s),
            other => RawValue::Json(other),
        }
    }

    /// Returns true for null and the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Runtime type name of the value.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "string",
            RawValue::Json(_) => "object",
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

/// A row keyed by column name.
pub type Row = IndexMap<String, RawValue>;

/// Parsed tabular data: ordered unique column names plus raw rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names in first-seen order.
    pub columns: Vec<String>,
    /// Rows; every row holds a value for every column.
    pub rows: Vec<Row>,
}

impl RawTable {
    /// Create a table, filling absent cells with empty strings and dropping
    /// keys that are not columns.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                columns
                    .iter()
                    .map(|col| {
                        let value = row.swap_remove(col).unwrap_or_else(RawValue::empty);
                        (col.clone(), value)
                    })
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&RawValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

/// Metadata about an imported source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name as given at import.
    pub file: String,
    /// SHA-256 hash of the raw content.
    pub hash: String,
    /// Content size in bytes.
    pub size_bytes: u64,
    /// Format the content was parsed as.
    pub format: InputFormat,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the import happened.
    pub imported_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub fn new(
        file: impl Into<String>,
        hash: String,
        size_bytes: u64,
        format: InputFormat,
        table: &RawTable,
    ) -> Self {
        Self {
            file: file.into(),
            hash,
            size_bytes,
            format,
            row_count: table.row_count(),
            column_count: table.column_count(),
            imported_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_absent_cells() {
        let mut sparse = Row::new();
        sparse.insert("b".to_string(), RawValue::Number(2.0));
        sparse.insert("extra".to_string(), RawValue::Bool(true));

        let table = RawTable::new(vec!["a".to_string(), "b".to_string()], vec![sparse]);

        let row = &table.rows[0];
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row["a"], RawValue::empty());
        assert_eq!(row["b"], RawValue::Number(2.0));
    }

    #[test]
    fn test_from_json_values() {
        assert_eq!(RawValue::from_json(serde_json::json!(3)), RawValue::Number(3.0));
        assert_eq!(RawValue::from_json(serde_json::json!(null)), RawValue::Null);
        assert_eq!(RawValue::from_json(serde_json::json!([1, 2])).type_name(), "object");
    }
}
