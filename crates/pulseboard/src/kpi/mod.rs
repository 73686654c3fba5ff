//! Key performance indicators derived from numeric columns.

mod deriver;
mod trend;

pub use deriver::{DEFAULT_MAX_KPIS, Kpi, KpiDeriver, humanize};
pub use trend::{Trend, classify, round2};
