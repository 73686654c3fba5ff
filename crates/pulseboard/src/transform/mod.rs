//! Row normalization and the chart pipeline.

mod aggregate;
mod cell;
mod engine;
mod filter;
mod normalize;
mod operations;

pub use aggregate::{aggregate_chunks, downsample, group_by_time};
pub use cell::{CellValue, NormalizedRow, reindex};
pub use engine::{ChartEngine, ChartFrame, ChartView, first_numeric_column};
pub use filter::{apply_brush, apply_range_filters, apply_view_mode};
pub use normalize::Normalizer;
pub use operations::{
    Aggregation, Brush, ChartSettings, ChartType, DateGrouping, EntryCount, MAX_CHART_POINTS,
    RANK_VIEW_SIZE, RangeFilter, ViewMode, median,
};
