//! Core type definitions for column semantics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Text values.
    String,
    /// Numeric values.
    Number,
    /// Date-like text values.
    Date,
    /// Boolean values.
    Boolean,
    /// Nested structured values (JSON arrays/objects).
    Object,
    /// Unable to determine type.
    #[default]
    Unknown,
}

impl ColumnType {
    /// All selectable types, in display order.
    pub const ALL: [ColumnType; 6] = [
        ColumnType::String,
        ColumnType::Number,
        ColumnType::Date,
        ColumnType::Boolean,
        ColumnType::Object,
        ColumnType::Unknown,
    ];

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Number)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
            ColumnType::Object => "object",
            ColumnType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" => Ok(ColumnType::String),
            "number" | "numeric" => Ok(ColumnType::Number),
            "date" => Ok(ColumnType::Date),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "object" => Ok(ColumnType::Object),
            "unknown" => Ok(ColumnType::Unknown),
            other => Err(format!(
                "Unknown column type '{}'. Valid: string, number, date, boolean, object, unknown",
                other
            )),
        }
    }
}
