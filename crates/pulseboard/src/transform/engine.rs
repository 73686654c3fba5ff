//! Chart engine: turns normalized rows into a bounded chart frame.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::error::{PulseboardError, Result};
use crate::schema::{ColumnMeta, ColumnType};

use super::aggregate::{downsample, group_by_time};
use super::cell::{NormalizedRow, reindex};
use super::filter::{apply_brush, apply_range_filters, apply_view_mode};
use super::operations::{
    Aggregation, Brush, ChartSettings, ChartType, DateGrouping, EntryCount, MAX_CHART_POINTS,
    RangeFilter, ViewMode,
};

/// A bounded, chart-ready row sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    pub y_axes: Vec<String>,
    pub chart_type: ChartType,
    /// Points before the brush was applied.
    pub total_points: usize,
    pub points: Vec<NormalizedRow>,
}

impl ChartFrame {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Builds chart frames from normalized rows.
pub struct ChartEngine {
    max_points: usize,
}

impl ChartEngine {
    /// Create an engine with the default point bound.
    pub fn new() -> Self {
        Self {
            max_points: MAX_CHART_POINTS,
        }
    }

    /// Create an engine with a custom point bound.
    pub fn with_max_points(max_points: usize) -> Self {
        Self {
            max_points: max_points.max(1),
        }
    }

    /// Run the full pipeline.
    ///
    /// Order: time grouping (date x-axis with an active grouping) or
    /// chunk downsampling, then range filters, view mode, brush, and finally
    /// projection onto the x and y columns.
    pub fn build(
        &self,
        meta: &IndexMap<String, ColumnMeta>,
        rows: &[NormalizedRow],
        settings: &ChartSettings,
        brush: Option<Brush>,
    ) -> Result<ChartFrame> {
        validate_columns(meta, settings)?;

        let x_is_date = settings
            .x_axis
            .as_deref()
            .and_then(|x| meta.get(x))
            .is_some_and(|m| m.column_type.is_temporal());

        let shaped = match settings.x_axis.as_deref() {
            Some(x)
                if x_is_date
                    && settings.grouping.is_active()
                    && settings.aggregation != Aggregation::None =>
            {
                let grouped =
                    group_by_time(rows, x, settings.grouping, settings.aggregation);
                downsample(grouped, self.max_points)
            }
            _ => downsample(rows.to_vec(), self.max_points),
        };

        let filtered = apply_range_filters(shaped, &settings.filters);
        let rank_column = first_numeric_column(meta);
        let viewed = apply_view_mode(
            filtered,
            settings.view_mode,
            settings.entries,
            rank_column,
        );
        let total_points = viewed.len();
        let brushed = apply_brush(viewed, brush);

        let y_axes = resolve_y_axes(meta, settings);
        let points = project(brushed, settings.x_axis.as_deref(), &y_axes);

        debug!(
            input = rows.len(),
            total_points,
            output = points.len(),
            "built chart frame"
        );

        Ok(ChartFrame {
            x_axis: settings.x_axis.clone(),
            y_axes,
            chart_type: settings.chart_type,
            total_points,
            points,
        })
    }
}

impl Default for ChartEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_columns(meta: &IndexMap<String, ColumnMeta>, settings: &ChartSettings) -> Result<()> {
    let referenced = settings
        .x_axis
        .iter()
        .chain(settings.y_axes.iter())
        .chain(settings.filters.keys());
    for col in referenced {
        if !meta.contains_key(col) {
            return Err(PulseboardError::UnknownColumn(col.clone()));
        }
    }
    Ok(())
}

/// First column declared `number`, in column order.
pub fn first_numeric_column(meta: &IndexMap<String, ColumnMeta>) -> Option<&str> {
    meta.iter()
        .find(|(_, m)| m.column_type == ColumnType::Number)
        .map(|(name, _)| name.as_str())
}

fn resolve_y_axes(meta: &IndexMap<String, ColumnMeta>, settings: &ChartSettings) -> Vec<String> {
    if !settings.y_axes.is_empty() {
        return settings.y_axes.clone();
    }
    meta.iter()
        .filter(|(name, m)| {
            m.column_type.is_numeric() && settings.x_axis.as_deref() != Some(name.as_str())
        })
        .map(|(name, _)| name.clone())
        .collect()
}

fn project(rows: Vec<NormalizedRow>, x_axis: Option<&str>, y_axes: &[String]) -> Vec<NormalizedRow> {
    let mut out: Vec<NormalizedRow> = rows
        .into_iter()
        .map(|mut row| {
            let cells = x_axis
                .into_iter()
                .chain(y_axes.iter().map(String::as_str))
                .filter_map(|col| row.cells.swap_remove(col).map(|v| (col.to_string(), v)))
                .collect();
            NormalizedRow::new(row.index, cells)
        })
        .collect();
    reindex(&mut out);
    out
}

/// Interactive chart state: settings plus an optional brush.
///
/// Changing any upstream setting clears the brush.
#[derive(Debug, Clone, Default)]
pub struct ChartView {
    settings: ChartSettings,
    brush: Option<Brush>,
}

impl ChartView {
    pub fn new(settings: ChartSettings) -> Self {
        Self {
            settings,
            brush: None,
        }
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn brush(&self) -> Option<Brush> {
        self.brush
    }

    pub fn set_brush(&mut self, brush: Option<Brush>) {
        self.brush = brush;
    }

    /// Replace all settings at once.
    pub fn set_settings(&mut self, settings: ChartSettings) {
        self.settings = settings;
        self.brush = None;
    }

    pub fn set_x_axis(&mut self, x_axis: Option<String>) {
        self.update(|s| s.x_axis = x_axis);
    }

    pub fn set_y_axes(&mut self, y_axes: Vec<String>) {
        self.update(|s| s.y_axes = y_axes);
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.update(|s| s.chart_type = chart_type);
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.update(|s| s.view_mode = view_mode);
    }

    pub fn set_entries(&mut self, entries: EntryCount) {
        self.update(|s| s.entries = entries);
    }

    pub fn set_filter(&mut self, column: impl Into<String>, filter: RangeFilter) {
        let column = column.into();
        self.update(|s| {
            s.filters.insert(column, filter);
        });
    }

    pub fn clear_filter(&mut self, column: &str) {
        self.update(|s| {
            s.filters.shift_remove(column);
        });
    }

    pub fn set_grouping(&mut self, grouping: DateGrouping) {
        self.update(|s| s.grouping = grouping);
    }

    pub fn set_aggregation(&mut self, aggregation: Aggregation) {
        self.update(|s| s.aggregation = aggregation);
    }

    /// Build the frame for the current state.
    pub fn render(
        &self,
        engine: &ChartEngine,
        meta: &IndexMap<String, ColumnMeta>,
        rows: &[NormalizedRow],
    ) -> Result<ChartFrame> {
        engine.build(meta, rows, &self.settings, self.brush)
    }

    fn update(&mut self, change: impl FnOnce(&mut ChartSettings)) {
        change(&mut self.settings);
        self.brush = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::CellValue;

    fn meta() -> IndexMap<String, ColumnMeta> {
        [
            ("date", ColumnType::Date),
            ("region", ColumnType::String),
            ("revenue", ColumnType::Number),
            ("orders", ColumnType::Number),
        ]
        .into_iter()
        .map(|(c, t)| (c.to_string(), ColumnMeta::inferred(t)))
        .collect()
    }

    fn rows(n: usize) -> Vec<NormalizedRow> {
        (0..n)
            .map(|i| {
                let mut cells = IndexMap::new();
                let day = (i % 28) + 1;
                let month = (i / 28) % 12 + 1;
                cells.insert(
                    "date".to_string(),
                    CellValue::Date(format!("2024-{:02}-{:02}", month, day)),
                );
                cells.insert("region".to_string(), CellValue::Text("EU".to_string()));
                cells.insert("revenue".to_string(), CellValue::Number(i as f64));
                cells.insert("orders".to_string(), CellValue::Number(1.0));
                NormalizedRow::new(i + 1, cells)
            })
            .collect()
    }

    #[test]
    fn test_projection_keeps_axes_and_index() {
        let settings = ChartSettings {
            x_axis: Some("date".to_string()),
            y_axes: vec!["revenue".to_string()],
            ..ChartSettings::default()
        };
        let frame = ChartEngine::new().build(&meta(), &rows(3), &settings, None).unwrap();

        assert_eq!(frame.len(), 3);
        let keys: Vec<&String> = frame.points[0].cells.keys().collect();
        assert_eq!(keys, vec!["date", "revenue"]);
        assert_eq!(frame.points[2].index, 3);
    }

    #[test]
    fn test_default_y_axes_are_numeric_columns() {
        let settings = ChartSettings {
            x_axis: Some("date".to_string()),
            ..ChartSettings::default()
        };
        let frame = ChartEngine::new().build(&meta(), &rows(2), &settings, None).unwrap();
        assert_eq!(frame.y_axes, vec!["revenue", "orders"]);
    }

    #[test]
    fn test_large_input_is_bounded_then_truncated() {
        let settings = ChartSettings {
            entries: EntryCount::try_from(1000).unwrap(),
            ..ChartSettings::default()
        };
        let frame = ChartEngine::new().build(&meta(), &rows(2000), &settings, None).unwrap();
        assert_eq!(frame.len(), 500);
        // chunk of 4: mean of 0..4
        assert_eq!(frame.points[0].number("revenue"), Some(1.5));
    }

    #[test]
    fn test_monthly_grouping_sums() {
        let settings = ChartSettings {
            x_axis: Some("date".to_string()),
            y_axes: vec!["orders".to_string()],
            grouping: DateGrouping::Month,
            aggregation: Aggregation::Sum,
            ..ChartSettings::default()
        };
        let frame = ChartEngine::new().build(&meta(), &rows(56), &settings, None).unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(
            frame.points[0].get("date"),
            Some(&CellValue::Date("2024-01".to_string()))
        );
        assert_eq!(frame.points[0].number("orders"), Some(28.0));
    }

    #[test]
    fn test_grouping_ignored_for_non_date_axis() {
        let settings = ChartSettings {
            x_axis: Some("region".to_string()),
            grouping: DateGrouping::Month,
            ..ChartSettings::default()
        };
        let frame = ChartEngine::new().build(&meta(), &rows(10), &settings, None).unwrap();
        assert_eq!(frame.len(), 10);
    }

    #[test]
    fn test_top5_ranks_by_first_numeric_column() {
        let settings = ChartSettings {
            view_mode: ViewMode::Top5,
            ..ChartSettings::default()
        };
        let frame = ChartEngine::new().build(&meta(), &rows(40), &settings, None).unwrap();
        let revenue: Vec<f64> = frame.points.iter().filter_map(|p| p.number("revenue")).collect();
        assert_eq!(revenue, vec![39.0, 38.0, 37.0, 36.0, 35.0]);
    }

    #[test]
    fn test_brush_applies_last() {
        let settings = ChartSettings::default();
        let frame = ChartEngine::new()
            .build(&meta(), &rows(10), &settings, Some(Brush::new(2, 4)))
            .unwrap();
        assert_eq!(frame.total_points, 10);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.points[0].number("revenue"), Some(2.0));
        assert_eq!(frame.points[0].index, 1);
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let settings = ChartSettings {
            x_axis: Some("missing".to_string()),
            ..ChartSettings::default()
        };
        let err = ChartEngine::new().build(&meta(), &rows(1), &settings, None).unwrap_err();
        assert!(matches!(err, PulseboardError::UnknownColumn(c) if c == "missing"));
    }

    #[test]
    fn test_empty_rows_give_empty_frame() {
        let frame = ChartEngine::new()
            .build(&meta(), &[], &ChartSettings::default(), Some(Brush::new(0, 3)))
            .unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_view_changes_reset_brush() {
        let mut view = ChartView::default();
        view.set_brush(Some(Brush::new(0, 1)));
        view.set_chart_type(ChartType::Line);
        assert_eq!(view.brush(), None);

        view.set_brush(Some(Brush::new(0, 1)));
        view.set_filter("revenue", RangeFilter::new(Some(1.0), None));
        assert_eq!(view.brush(), None);
        assert_eq!(view.settings().filters.len(), 1);

        view.set_brush(Some(Brush::new(0, 1)));
        view.set_aggregation(Aggregation::Max);
        assert_eq!(view.brush(), None);
    }
}
