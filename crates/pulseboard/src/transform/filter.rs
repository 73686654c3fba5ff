//! Range filters, ranked views and the brush viewport.
//!
//! Stages run in a fixed order: range filters, then the view mode, then the
//! brush. Each stage reindexes its output.

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::cell::{NormalizedRow, reindex};
use super::operations::{Brush, EntryCount, RANK_VIEW_SIZE, RangeFilter, ViewMode};

/// Keep rows satisfying every active filter.
///
/// A row passes a filter only when its cell is a number within the range.
pub fn apply_range_filters(
    rows: Vec<NormalizedRow>,
    filters: &IndexMap<String, RangeFilter>,
) -> Vec<NormalizedRow> {
    let active: Vec<(&String, &RangeFilter)> =
        filters.iter().filter(|(_, f)| f.is_active()).collect();

    let mut out: Vec<NormalizedRow> = if active.is_empty() {
        rows
    } else {
        rows.into_iter()
            .filter(|row| {
                active.iter().all(|(col, filter)| {
                    row.number(col).is_some_and(|value| filter.contains(value))
                })
            })
            .collect()
    };
    reindex(&mut out);
    out
}

/// Apply the view mode.
///
/// `all` truncates to the entry count. The ranked views sort by
/// `rank_column` and keep five rows; without a rank column they keep the
/// first five in their current order.
pub fn apply_view_mode(
    mut rows: Vec<NormalizedRow>,
    mode: ViewMode,
    entries: EntryCount,
    rank_column: Option<&str>,
) -> Vec<NormalizedRow> {
    match mode {
        ViewMode::All => rows.truncate(entries.get()),
        ViewMode::Top5 | ViewMode::Bottom5 => {
            if let Some(col) = rank_column {
                let descending = mode == ViewMode::Top5;
                // Non-numbers sort last in both directions
                let missing = if descending { f64::NEG_INFINITY } else { f64::INFINITY };
                rows.sort_by(|a, b| {
                    let a = a.number(col).unwrap_or(missing);
                    let b = b.number(col).unwrap_or(missing);
                    let ord: Ordering = a.total_cmp(&b);
                    if descending { ord.reverse() } else { ord }
                });
            }
            rows.truncate(RANK_VIEW_SIZE);
        }
    }
    reindex(&mut rows);
    rows
}

/// Restrict to an inclusive 0-based position range.
///
/// Bounds past the end are clamped; an inverted range yields nothing.
pub fn apply_brush(rows: Vec<NormalizedRow>, brush: Option<Brush>) -> Vec<NormalizedRow> {
    let Some(brush) = brush else {
        return rows;
    };
    if rows.is_empty() || brush.start > brush.end || brush.start >= rows.len() {
        return Vec::new();
    }

    let end = brush.end.min(rows.len() - 1);
    let mut out: Vec<NormalizedRow> = rows
        .into_iter()
        .skip(brush.start)
        .take(end - brush.start + 1)
        .collect();
    reindex(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::CellValue;

    fn rows(values: &[f64]) -> Vec<NormalizedRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut cells = IndexMap::new();
                cells.insert("x".to_string(), CellValue::Number(*v));
                cells.insert("label".to_string(), CellValue::Text(format!("r{}", i)));
                NormalizedRow::new(i + 1, cells)
            })
            .collect()
    }

    fn xs(rows: &[NormalizedRow]) -> Vec<f64> {
        rows.iter().filter_map(|r| r.number("x")).collect()
    }

    #[test]
    fn test_min_and_max_filters_compose() {
        let mut filters = IndexMap::new();
        filters.insert("x".to_string(), RangeFilter::new(Some(5.0), Some(10.0)));

        let out = apply_range_filters(rows(&[1.0, 5.0, 10.0, 15.0]), &filters);
        assert_eq!(xs(&out), vec![5.0, 10.0]);
        assert_eq!(out[0].index, 1);
    }

    #[test]
    fn test_filter_on_text_column_excludes_rows() {
        let mut filters = IndexMap::new();
        filters.insert("label".to_string(), RangeFilter::new(Some(0.0), None));
        assert!(apply_range_filters(rows(&[1.0, 2.0]), &filters).is_empty());
    }

    #[test]
    fn test_inactive_filter_is_ignored() {
        let mut filters = IndexMap::new();
        filters.insert("label".to_string(), RangeFilter::default());
        assert_eq!(apply_range_filters(rows(&[1.0, 2.0]), &filters).len(), 2);
    }

    #[test]
    fn test_all_view_truncates() {
        let input = rows(&(0..30).map(f64::from).collect::<Vec<_>>());
        let entries = EntryCount::try_from(20).unwrap();
        assert_eq!(apply_view_mode(input, ViewMode::All, entries, Some("x")).len(), 20);
    }

    #[test]
    fn test_top_and_bottom_views() {
        let input = rows(&[3.0, 9.0, 1.0, 7.0, 5.0, 8.0, 2.0]);

        let top = apply_view_mode(input.clone(), ViewMode::Top5, EntryCount::default(), Some("x"));
        assert_eq!(xs(&top), vec![9.0, 8.0, 7.0, 5.0, 3.0]);
        assert_eq!(top[0].index, 1);

        let bottom = apply_view_mode(input, ViewMode::Bottom5, EntryCount::default(), Some("x"));
        assert_eq!(xs(&bottom), vec![1.0, 2.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_ranked_view_without_numeric_column_keeps_order() {
        let input = rows(&[3.0, 9.0, 1.0, 7.0, 5.0, 8.0]);
        let out = apply_view_mode(input, ViewMode::Top5, EntryCount::default(), None);
        assert_eq!(xs(&out), vec![3.0, 9.0, 1.0, 7.0, 5.0]);
    }

    #[test]
    fn test_brush_clamps_and_reindexes() {
        let out = apply_brush(rows(&[1.0, 2.0, 3.0, 4.0]), Some(Brush::new(1, 99)));
        assert_eq!(xs(&out), vec![2.0, 3.0, 4.0]);
        assert_eq!(out[0].index, 1);

        assert!(apply_brush(rows(&[1.0, 2.0]), Some(Brush::new(2, 1))).is_empty());
        assert_eq!(apply_brush(rows(&[1.0, 2.0]), None).len(), 2);
    }
}
