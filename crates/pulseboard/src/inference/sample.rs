//! First-row type inference.
//!
//! Inference looks at a single sample row rather than scanning whole
//! columns. It is advisory: any column may be overridden before a dataset is
//! committed, and overrides win for every downstream stage.

use indexmap::IndexMap;

use crate::input::{RawTable, RawValue, Row};
use crate::schema::{ColumnMeta, ColumnType};

use super::date::looks_like_date;

/// Infers column types from a sample row.
pub struct TypeInference;

impl TypeInference {
    /// Infer the type of one sample value.
    pub fn infer_value(value: &RawValue) -> ColumnType {
        match value {
            RawValue::Null => ColumnType::Unknown,
            RawValue::Number(_) => ColumnType::Number,
            RawValue::Bool(_) => ColumnType::Boolean,
            RawValue::Text(s) if looks_like_date(s) => ColumnType::Date,
            RawValue::Text(_) => ColumnType::String,
            RawValue::Json(_) => ColumnType::Object,
        }
    }

    /// Infer a type for every column from one sample row.
    ///
    /// Columns missing from the sample are `unknown`.
    pub fn infer_row(columns: &[String], sample: Option<&Row>) -> IndexMap<String, ColumnType> {
        columns
            .iter()
            .map(|col| {
                let ty = sample
                    .and_then(|row| row.get(col))
                    .map(Self::infer_value)
                    .unwrap_or(ColumnType::Unknown);
                (col.clone(), ty)
            })
            .collect()
    }

    /// Build initial column metadata for a parsed table from its first row.
    pub fn infer_table(table: &RawTable) -> IndexMap<String, ColumnMeta> {
        Self::infer_row(&table.columns, table.rows.first())
            .into_iter()
            .map(|(col, ty)| (col, ColumnMeta::inferred(ty)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_value() {
        assert_eq!(TypeInference::infer_value(&RawValue::Null), ColumnType::Unknown);
        assert_eq!(TypeInference::infer_value(&RawValue::Number(1.0)), ColumnType::Number);
        assert_eq!(TypeInference::infer_value(&RawValue::Bool(false)), ColumnType::Boolean);
        assert_eq!(TypeInference::infer_value(&"2024-01-01".into()), ColumnType::Date);
        assert_eq!(TypeInference::infer_value(&"42".into()), ColumnType::String);
        assert_eq!(TypeInference::infer_value(&"".into()), ColumnType::String);
        assert_eq!(
            TypeInference::infer_value(&RawValue::Json(serde_json::json!({"a": 1}))),
            ColumnType::Object
        );
    }

    #[test]
    fn test_only_first_row_is_sampled() {
        let mut first = Row::new();
        first.insert("v".to_string(), RawValue::from("n/a"));
        let mut second = Row::new();
        second.insert("v".to_string(), RawValue::Number(3.0));

        let table = RawTable::new(vec!["v".to_string()], vec![first, second]);
        let meta = TypeInference::infer_table(&table);

        assert_eq!(meta["v"].column_type, ColumnType::String);
        assert!(!meta["v"].overridden);
    }

    #[test]
    fn test_empty_table_is_unknown() {
        let table = RawTable::new(vec!["a".to_string()], Vec::new());
        let meta = TypeInference::infer_table(&table);
        assert_eq!(meta["a"].column_type, ColumnType::Unknown);
    }
}
