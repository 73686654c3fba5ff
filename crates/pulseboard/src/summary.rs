//! Per-column statistical summary of a normalized dataset.
//!
//! The summary feeds the insight context, so it favors short, readable
//! figures over completeness.

use std::collections::HashSet;
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::kpi::round2;
use crate::schema::{ColumnMeta, ColumnType};
use crate::transform::{NormalizedRow, median};

/// Distinct values listed per non-numeric column.
const SAMPLE_VALUES: usize = 5;

/// Statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Statistics for any other column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub distinct: usize,
    /// First distinct non-empty values, in row order.
    pub samples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Summary of every column of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub columns: IndexMap<String, ColumnSummary>,
}

impl DatasetSummary {
    /// Summarize normalized rows using the declared column types.
    pub fn compute(meta: &IndexMap<String, ColumnMeta>, rows: &[NormalizedRow]) -> Self {
        let columns = meta
            .iter()
            .map(|(name, m)| {
                let summary = if m.column_type == ColumnType::Number {
                    ColumnSummary::Numeric(numeric(name, rows))
                } else {
                    ColumnSummary::Categorical(categorical(name, rows))
                };
                (name.clone(), summary)
            })
            .collect();

        Self {
            row_count: rows.len(),
            columns,
        }
    }

    /// Render as plain text, one line per column.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (name, summary) in &self.columns {
            match summary {
                ColumnSummary::Numeric(s) if s.count == 0 => {
                    let _ = writeln!(out, "- {}: no values", name);
                }
                ColumnSummary::Numeric(s) => {
                    let _ = writeln!(
                        out,
                        "- {}: min {}, max {}, mean {}, median {}, std {}",
                        name, s.min, s.max, s.mean, s.median, s.std
                    );
                }
                ColumnSummary::Categorical(s) => {
                    let _ = writeln!(
                        out,
                        "- {}: {} distinct values, e.g. {}",
                        name,
                        s.distinct,
                        s.samples.join(", ")
                    );
                }
            }
        }
        out
    }
}

fn numeric(column: &str, rows: &[NormalizedRow]) -> NumericSummary {
    let values: Vec<f64> = rows.iter().filter_map(|row| row.number(column)).collect();
    if values.is_empty() {
        return NumericSummary {
            count: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            median: 0.0,
            std: 0.0,
        };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    NumericSummary {
        count: values.len(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: round2(mean),
        median: round2(median(&values)),
        std: round2(variance.sqrt()),
    }
}

fn categorical(column: &str, rows: &[NormalizedRow]) -> CategoricalSummary {
    let mut seen: HashSet<String> = HashSet::new();
    let mut samples = Vec::new();
    let mut count = 0;

    for cell in rows.iter().filter_map(|row| row.get(column)) {
        let text = cell.to_string();
        if text.is_empty() {
            continue;
        }
        count += 1;
        if seen.insert(text.clone()) && samples.len() < SAMPLE_VALUES {
            samples.push(text);
        }
    }

    CategoricalSummary {
        count,
        distinct: seen.len(),
        samples,
    }
}
