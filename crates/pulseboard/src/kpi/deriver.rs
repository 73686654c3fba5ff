//! KPI derivation from normalized rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{ColumnMeta, ColumnType};
use crate::transform::NormalizedRow;

use super::trend::{Trend, classify, mean, round2};

/// Default number of KPIs derived per dataset.
pub const DEFAULT_MAX_KPIS: usize = 4;

const CURRENCY_HINTS: [&str; 4] = ["revenue", "sales", "price", "cost"];

/// A summary statistic for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    /// Humanized column name.
    pub name: String,
    /// Source column.
    pub column: String,
    /// Mean of the non-zero values.
    pub value: f64,
    /// Max of the non-zero values.
    pub target: f64,
    /// `"$"` for currency-like columns, otherwise empty.
    pub unit: String,
    pub trend: Trend,
    pub change_percent: f64,
}

/// Derives KPIs from the first numeric columns of a dataset.
///
/// Zero values are treated as absent: they are dropped before every
/// statistic, and a column with nothing left yields no KPI.
pub struct KpiDeriver {
    max_kpis: usize,
}

impl KpiDeriver {
    pub fn new() -> Self {
        Self {
            max_kpis: DEFAULT_MAX_KPIS,
        }
    }

    pub fn with_max_kpis(max_kpis: usize) -> Self {
        Self { max_kpis }
    }

    /// Derive KPIs for the first `max_kpis` number columns, in column order.
    pub fn derive(&self, meta: &IndexMap<String, ColumnMeta>, rows: &[NormalizedRow]) -> Vec<Kpi> {
        let kpis: Vec<Kpi> = meta
            .iter()
            .filter(|(_, m)| m.column_type == ColumnType::Number)
            .take(self.max_kpis)
            .filter_map(|(column, _)| Self::derive_column(column, rows))
            .collect();

        debug!(rows = rows.len(), kpis = kpis.len(), "derived KPIs");
        kpis
    }

    /// Derive a KPI for a single column, or `None` when it has no non-zero values.
    pub fn derive_column(column: &str, rows: &[NormalizedRow]) -> Option<Kpi> {
        let values: Vec<f64> = rows
            .iter()
            .filter_map(|row| row.number(column))
            .filter(|v| *v != 0.0)
            .collect();

        let value = mean(&values)?;
        let target = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (trend, change_percent) = classify(&values);

        Some(Kpi {
            name: humanize(column),
            column: column.to_string(),
            value: round2(value),
            target: round2(target),
            unit: unit_for(column).to_string(),
            trend,
            change_percent,
        })
    }
}

impl Default for KpiDeriver {
    fn default() -> Self {
        Self::new()
    }
}

fn unit_for(column: &str) -> &'static str {
    let lower = column.to_lowercase();
    if CURRENCY_HINTS.iter().any(|hint| lower.contains(hint)) {
        "$"
    } else {
        ""
    }
}

/// Turn a column identifier into a display name.
///
/// `total_revenue`, `total-revenue` and `totalRevenue` all become
/// `Total Revenue`.
pub fn humanize(column: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in column.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
