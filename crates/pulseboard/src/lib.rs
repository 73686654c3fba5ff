//! Pulseboard: the data core of an analytics dashboard.
//!
//! Pulseboard turns an uploaded CSV, JSON or Excel file into a typed dataset,
//! then derives KPIs and bounded, chart-ready frames from it. An optional AI
//! collaborator can describe the data, answer questions and suggest a chart.
//!
//! # Core Principles
//!
//! - **Advisory inference**: types are guessed from the first row and can be
//!   overridden before commit
//! - **Immutable datasets**: once committed, a dataset never changes
//! - **Bounded views**: a chart frame never holds more than 500 points
//!
//! # Example
//!
//! ```no_run
//! use pulseboard::{ChartSettings, ColumnType, Pulseboard};
//!
//! let mut board = Pulseboard::new();
//! let mut draft = board.import_file("sales.csv").unwrap();
//! draft.set_column_type("region", ColumnType::String).unwrap();
//! let id = board.commit(draft);
//!
//! for kpi in board.kpis(&id).unwrap() {
//!     println!("{}: {} ({})", kpi.name, kpi.value, kpi.trend);
//! }
//! let frame = board.chart(&id, &ChartSettings::default(), None).unwrap();
//! println!("{} points", frame.len());
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod inference;
pub mod input;
pub mod kpi;
pub mod llm;
pub mod schema;
pub mod summary;
pub mod transform;

mod pulseboard;

pub use crate::pulseboard::Pulseboard;
pub use config::{CredentialStore, FileCredentialStore, MemoryCredentialStore, PulseboardConfig};
pub use dataset::{Dataset, DatasetStore, ImportDraft};
pub use error::{PulseboardError, Result, RowError, RowErrorKind};
pub use input::{InputFormat, Parser, ParserConfig, RawTable, RawValue, SourceMetadata};
pub use kpi::{Kpi, KpiDeriver, Trend};
pub use llm::{
    AnthropicProvider, Assisted, InsightProvider, InsightService, LlmConfig, MockProvider,
    OpenAIProvider,
};
pub use schema::{ColumnMeta, ColumnType};
pub use summary::DatasetSummary;
pub use transform::{
    Aggregation, Brush, CellValue, ChartEngine, ChartFrame, ChartSettings, ChartType, ChartView,
    DateGrouping, EntryCount, NormalizedRow, RangeFilter, ViewMode,
};
