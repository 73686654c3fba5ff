//! Row normalization: re-typing every cell by its declared column type.

use indexmap::IndexMap;

use crate::input::{RawTable, RawValue, Row};
use crate::schema::{ColumnMeta, ColumnType};

use super::cell::{CellValue, NormalizedRow};

/// Coerces raw rows to their declared column types.
pub struct Normalizer;

impl Normalizer {
    /// Coerce one value to a declared type.
    ///
    /// | type | rule |
    /// |---|---|
    /// | number | parsed; empty or non-numeric becomes 0 |
    /// | date | text kept verbatim |
    /// | boolean | truthiness of the raw value |
    /// | other | passed through |
    pub fn coerce(value: &RawValue, column_type: ColumnType) -> CellValue {
        match column_type {
            ColumnType::Number => CellValue::Number(to_number(value)),
            ColumnType::Boolean => CellValue::Boolean(is_truthy(value)),
            ColumnType::Date => match value {
                RawValue::Text(s) => CellValue::Date(s.clone()),
                other => CellValue::from(other),
            },
            ColumnType::String | ColumnType::Object | ColumnType::Unknown => {
                CellValue::from(value)
            }
        }
    }

    /// Normalize every row of a table. Indices start at 1.
    pub fn normalize(table: &RawTable, meta: &IndexMap<String, ColumnMeta>) -> Vec<NormalizedRow> {
        Self::normalize_rows(&table.columns, &table.rows, meta)
    }

    /// Normalize a slice of rows against the given columns.
    pub fn normalize_rows(
        columns: &[String],
        rows: &[Row],
        meta: &IndexMap<String, ColumnMeta>,
    ) -> Vec<NormalizedRow> {
        let types: Vec<ColumnType> = columns.iter().map(|c| column_type(meta, c)).collect();
        let empty = RawValue::empty();

        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let cells = columns
                    .iter()
                    .zip(&types)
                    .map(|(col, ty)| {
                        let value = row.get(col).unwrap_or(&empty);
                        (col.clone(), Self::coerce(value, *ty))
                    })
                    .collect();
                NormalizedRow::new(i + 1, cells)
            })
            .collect()
    }

    /// Normalize already-normalized rows again.
    ///
    /// With unchanged metadata this is the identity on cell values.
    pub fn renormalize(
        rows: &[NormalizedRow],
        meta: &IndexMap<String, ColumnMeta>,
    ) -> Vec<NormalizedRow> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let cells = row
                    .cells
                    .iter()
                    .map(|(col, cell)| {
                        let raw = RawValue::from(cell);
                        (col.clone(), Self::coerce(&raw, column_type(meta, col)))
                    })
                    .collect();
                NormalizedRow::new(i + 1, cells)
            })
            .collect()
    }
}

fn column_type(meta: &IndexMap<String, ColumnMeta>, column: &str) -> ColumnType {
    meta.get(column)
        .map(|m| m.column_type)
        .unwrap_or(ColumnType::Unknown)
}

fn to_number(value: &RawValue) -> f64 {
    let n = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        RawValue::Bool(true) => 1.0,
        RawValue::Bool(false) | RawValue::Null | RawValue::Json(_) => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

fn is_truthy(value: &RawValue) -> bool {
    match value {
        RawValue::Null => false,
        RawValue::Bool(b) => *b,
        RawValue::Number(n) => *n != 0.0 && !n.is_nan(),
        RawValue::Text(s) => !s.is_empty(),
        RawValue::Json(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(types: &[(&str, ColumnType)]) -> IndexMap<String, ColumnMeta> {
        types
            .iter()
            .map(|(c, t)| (c.to_string(), ColumnMeta::inferred(*t)))
            .collect()
    }

    #[test]
    fn test_number_coercion() {
        let n = |v: RawValue| Normalizer::coerce(&v, ColumnType::Number);
        assert_eq!(n("12.5".into()), CellValue::Number(12.5));
        assert_eq!(n(" 7 ".into()), CellValue::Number(7.0));
        assert_eq!(n("".into()), CellValue::Number(0.0));
        assert_eq!(n("abc".into()), CellValue::Number(0.0));
        assert_eq!(n("inf".into()), CellValue::Number(0.0));
        assert_eq!(n(RawValue::Null), CellValue::Number(0.0));
        assert_eq!(n(RawValue::Bool(true)), CellValue::Number(1.0));
    }

    #[test]
    fn test_boolean_truthiness() {
        let b = |v: RawValue| Normalizer::coerce(&v, ColumnType::Boolean);
        assert_eq!(b("".into()), CellValue::Boolean(false));
        assert_eq!(b("false".into()), CellValue::Boolean(true));
        assert_eq!(b(RawValue::Number(0.0)), CellValue::Boolean(false));
        assert_eq!(b(RawValue::Number(2.0)), CellValue::Boolean(true));
        assert_eq!(b(RawValue::Null), CellValue::Boolean(false));
    }

    #[test]
    fn test_date_and_string_pass_through() {
        assert_eq!(
            Normalizer::coerce(&"01/02/2024".into(), ColumnType::Date),
            CellValue::Date("01/02/2024".to_string())
        );
        assert_eq!(
            Normalizer::coerce(&RawValue::Number(5.0), ColumnType::String),
            CellValue::Number(5.0)
        );
        assert_eq!(
            Normalizer::coerce(&RawValue::Null, ColumnType::Unknown),
            CellValue::Unknown(RawValue::Null)
        );
    }

    #[test]
    fn test_normalize_assigns_indices() {
        let mut row = Row::new();
        row.insert("qty".to_string(), RawValue::from("3"));
        let table = RawTable::new(vec!["qty".to_string(), "note".to_string()], vec![row.clone(), row]);

        let rows = Normalizer::normalize(
            &table,
            &meta(&[("qty", ColumnType::Number), ("note", ColumnType::String)]),
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].index, 2);
        assert_eq!(rows[0].get("qty"), Some(&CellValue::Number(3.0)));
        assert_eq!(rows[0].get("note"), Some(&CellValue::Text(String::new())));
    }

    #[test]
    fn test_renormalize_is_stable() {
        let mut row = Row::new();
        row.insert("a".to_string(), RawValue::from("x"));
        row.insert("b".to_string(), RawValue::from("2024-01-01"));
        row.insert("c".to_string(), RawValue::from("yes"));
        let table = RawTable::new(vec!["a".into(), "b".into(), "c".into()], vec![row]);
        let meta = meta(&[
            ("a", ColumnType::Number),
            ("b", ColumnType::Date),
            ("c", ColumnType::Boolean),
        ]);

        let once = Normalizer::normalize(&table, &meta);
        let twice = Normalizer::renormalize(&once, &meta);
        assert_eq!(once, twice);
    }
}
