//! Chart command - build a chart frame and write it as JSON.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use indexmap::IndexMap;
use pulseboard::{
    Aggregation, Brush, ChartSettings, ChartType, DateGrouping, EntryCount, Pulseboard,
    RangeFilter, ViewMode,
};

use super::{CommandResult, commit_with_overrides};
use crate::cli::{Bound, BrushArg, TypeOverride};

/// Parsed chart flags.
pub struct ChartArgs {
    pub x: Option<String>,
    pub y: Vec<String>,
    pub chart_type: ChartType,
    pub view: ViewMode,
    pub entries: usize,
    pub min: Vec<Bound>,
    pub max: Vec<Bound>,
    pub group_by: DateGrouping,
    pub aggregate: Aggregation,
    pub brush: Option<BrushArg>,
}

impl ChartArgs {
    fn settings(&self) -> CommandResult<ChartSettings> {
        let mut filters: IndexMap<String, RangeFilter> = IndexMap::new();
        for bound in &self.min {
            filters.entry(bound.column.clone()).or_default().min = Some(bound.value);
        }
        for bound in &self.max {
            filters.entry(bound.column.clone()).or_default().max = Some(bound.value);
        }

        Ok(ChartSettings {
            x_axis: self.x.clone(),
            y_axes: self.y.clone(),
            chart_type: self.chart_type,
            view_mode: self.view,
            entries: EntryCount::try_from(self.entries)?,
            filters,
            grouping: self.group_by,
            aggregation: self.aggregate,
        })
    }
}

pub fn run(
    file: PathBuf,
    args: ChartArgs,
    output: Option<PathBuf>,
    overrides: &[TypeOverride],
) -> CommandResult {
    let settings = args.settings()?;
    let brush = args.brush.map(|b| Brush::new(b.start, b.end));

    let mut board = Pulseboard::new();
    let id = commit_with_overrides(&mut board, &file, overrides)?;
    let frame = board.chart(&id, &settings, brush)?;

    let json = serde_json::to_string_pretty(&frame)?;
    match output {
        Some(path) => {
            fs::write(&path, json)?;
            eprintln!(
                "{} {} points ({} before brush) to {}",
                "Wrote".green(),
                frame.len(),
                frame.total_points,
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
