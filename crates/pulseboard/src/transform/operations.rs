//! Settings vocabulary for the chart pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Upper bound on points in a chart frame.
pub const MAX_CHART_POINTS: usize = 500;

/// Rows kept by the top/bottom views.
pub const RANK_VIEW_SIZE: usize = 5;

/// How a group of numeric values is reduced to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Min,
    Max,
    Median,
    #[default]
    Average,
    /// Bucketing disabled; rows pass through.
    None,
}

impl Aggregation {
    /// Reduce values; `None` for an empty slice or when aggregation is off.
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Aggregation::Sum => Some(values.iter().sum()),
            Aggregation::Min => values.iter().copied().reduce(f64::min),
            Aggregation::Max => values.iter().copied().reduce(f64::max),
            Aggregation::Average => Some(values.iter().sum::<f64>() / values.len() as f64),
            Aggregation::Median => Some(median(values)),
            Aggregation::None => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Median => "median",
            Aggregation::Average => "average",
            Aggregation::None => "none",
        }
    }
}

/// Median; the mean of the two middle values on an even count.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "median" => Ok(Aggregation::Median),
            "average" | "avg" | "mean" => Ok(Aggregation::Average),
            "none" => Ok(Aggregation::None),
            other => Err(format!(
                "Unknown aggregation '{}'. Valid: sum, min, max, median, average, none",
                other
            )),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time bucket size for date x-axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateGrouping {
    #[default]
    None,
    Day,
    Week,
    Month,
}

impl DateGrouping {
    /// Bucket key for a date: `YYYY-MM-DD`, `YYYY-W{week}` or `YYYY-MM`.
    pub fn bucket_key(&self, date: NaiveDate) -> Option<String> {
        match self {
            DateGrouping::None => None,
            DateGrouping::Day => Some(date.format("%Y-%m-%d").to_string()),
            DateGrouping::Week => {
                let week = date.iso_week();
                Some(format!("{}-W{}", week.year(), week.week()))
            }
            DateGrouping::Month => Some(date.format("%Y-%m").to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, DateGrouping::None)
    }
}

impl FromStr for DateGrouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(DateGrouping::None),
            "day" => Ok(DateGrouping::Day),
            "week" => Ok(DateGrouping::Week),
            "month" => Ok(DateGrouping::Month),
            other => Err(format!(
                "Unknown grouping '{}'. Valid: none, day, week, month",
                other
            )),
        }
    }
}

/// Which rows of the frame are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// First N rows, N being the entry count.
    #[default]
    All,
    /// Five largest by the first numeric column.
    Top5,
    /// Five smallest by the first numeric column.
    Bottom5,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ViewMode::All),
            "top5" | "top" => Ok(ViewMode::Top5),
            "bottom5" | "bottom" => Ok(ViewMode::Bottom5),
            other => Err(format!(
                "Unknown view mode '{}'. Valid: all, top5, bottom5",
                other
            )),
        }
    }
}

/// Number of entries shown in the `all` view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct EntryCount(usize);

impl EntryCount {
    pub const ALLOWED: [usize; 6] = [20, 50, 100, 250, 500, 1000];

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for EntryCount {
    fn default() -> Self {
        EntryCount(50)
    }
}

impl TryFrom<usize> for EntryCount {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(EntryCount(value))
        } else {
            Err(format!(
                "Unsupported entry count {}. Valid: {:?}",
                value,
                Self::ALLOWED
            ))
        }
    }
}

impl From<EntryCount> for usize {
    fn from(count: EntryCount) -> Self {
        count.0
    }
}

/// Chart rendering type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
        }
    }
}

impl FromStr for ChartType {
    type Err = String;

    /// Lenient: picks the first chart name among the words, so "Line chart",
    /// "`pie`" and "I'd use a bar chart" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(|c: char| !c.is_alphanumeric())
            .find_map(|word| match word.to_lowercase().as_str() {
                "bar" => Some(ChartType::Bar),
                "line" => Some(ChartType::Line),
                "area" => Some(ChartType::Area),
                "pie" => Some(ChartType::Pie),
                "scatter" => Some(ChartType::Scatter),
                _ => None,
            })
            .ok_or_else(|| {
                format!(
                    "Unknown chart type '{}'. Valid: bar, line, area, pie, scatter",
                    s.trim()
                )
            })
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive numeric range filter on one column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// A filter with neither bound set has no effect.
    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Inclusive position range selected on the final sequence (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brush {
    pub start: usize,
    pub end: usize,
}

impl Brush {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Everything that shapes a chart frame except the brush.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartSettings {
    /// X-axis column.
    #[serde(default)]
    pub x_axis: Option<String>,
    /// Y-axis columns; empty selects every numeric column.
    #[serde(default)]
    pub y_axes: Vec<String>,
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub entries: EntryCount,
    /// Range filters keyed by column.
    #[serde(default)]
    pub filters: IndexMap<String, RangeFilter>,
    #[serde(default)]
    pub grouping: DateGrouping,
    #[serde(default)]
    pub aggregation: Aggregation,
}
