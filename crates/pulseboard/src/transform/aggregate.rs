//! Downsampling and time-bucket aggregation.
//!
//! Downsampling averages contiguous chunks of rows. It keeps the order and
//! overall shape of the series but is an approximation, not a stratified
//! sample: spikes narrower than a chunk are smoothed away.

use indexmap::IndexMap;
use tracing::debug;

use crate::inference::parse_date;

use super::cell::{CellValue, NormalizedRow, reindex};
use super::operations::{Aggregation, DateGrouping};

/// Bound a sequence to at most `max_points` rows by chunk averaging.
///
/// Sequences already within the bound are only reindexed.
pub fn downsample(mut rows: Vec<NormalizedRow>, max_points: usize) -> Vec<NormalizedRow> {
    let max_points = max_points.max(1);
    if rows.len() <= max_points {
        reindex(&mut rows);
        return rows;
    }

    let chunk_size = rows.len().div_ceil(max_points);
    debug!(rows = rows.len(), chunk_size, "downsampling");
    aggregate_chunks(&rows, chunk_size, Aggregation::Average)
}

/// Reduce contiguous chunks of `chunk_size` rows to one row each.
pub fn aggregate_chunks(
    rows: &[NormalizedRow],
    chunk_size: usize,
    method: Aggregation,
) -> Vec<NormalizedRow> {
    let mut out: Vec<NormalizedRow> = rows
        .chunks(chunk_size.max(1))
        .map(|chunk| {
            let group: Vec<&NormalizedRow> = chunk.iter().collect();
            reduce_group(&group, method)
        })
        .collect();
    reindex(&mut out);
    out
}

/// Group rows into time buckets on `x_axis` and reduce each bucket.
///
/// Buckets keep first-seen order. Cells that do not parse as dates are
/// bucketed under their own text. With no active grouping, or with
/// [`Aggregation::None`], rows pass through reindexed.
pub fn group_by_time(
    rows: &[NormalizedRow],
    x_axis: &str,
    grouping: DateGrouping,
    method: Aggregation,
) -> Vec<NormalizedRow> {
    if !grouping.is_active() || method == Aggregation::None {
        let mut out = rows.to_vec();
        reindex(&mut out);
        return out;
    }

    let mut buckets: IndexMap<String, Vec<&NormalizedRow>> = IndexMap::new();
    for row in rows {
        let key = row
            .get(x_axis)
            .map(|cell| bucket_key(cell, grouping))
            .unwrap_or_default();
        buckets.entry(key).or_default().push(row);
    }

    debug!(rows = rows.len(), buckets = buckets.len(), ?grouping, %method, "grouped by time");

    let mut out: Vec<NormalizedRow> = buckets
        .into_iter()
        .map(|(key, group)| {
            let mut row = reduce_group(&group, method);
            row.cells.insert(x_axis.to_string(), CellValue::Date(key));
            row
        })
        .collect();
    reindex(&mut out);
    out
}

fn bucket_key(cell: &CellValue, grouping: DateGrouping) -> String {
    cell.as_text()
        .and_then(parse_date)
        .and_then(|date| grouping.bucket_key(date))
        .unwrap_or_else(|| cell.to_string())
}

/// Collapse a non-empty group to one row.
///
/// Columns whose first cell is a number are reduced across the group, with
/// non-number cells counting as 0. Other columns keep the first row's value.
fn reduce_group(group: &[&NormalizedRow], method: Aggregation) -> NormalizedRow {
    let Some(first) = group.first() else {
        return NormalizedRow::new(0, IndexMap::new());
    };

    let cells = first
        .cells
        .iter()
        .map(|(col, cell)| {
            let value = if cell.is_number() {
                let values: Vec<f64> = group
                    .iter()
                    .map(|row| row.number(col).unwrap_or(0.0))
                    .collect();
                method
                    .reduce(&values)
                    .map(CellValue::Number)
                    .unwrap_or_else(|| cell.clone())
            } else {
                cell.clone()
            };
            (col.clone(), value)
        })
        .collect();

    NormalizedRow::new(first.index, cells)
}
