//! KPIs command - derive KPIs for numeric columns.

use std::path::PathBuf;

use colored::Colorize;
use pulseboard::{Pulseboard, Trend};

use super::{CommandResult, commit_with_overrides};
use crate::cli::TypeOverride;

pub fn run(file: PathBuf, json_output: bool, overrides: &[TypeOverride]) -> CommandResult {
    let mut board = Pulseboard::new();
    let id = commit_with_overrides(&mut board, &file, overrides)?;
    let kpis = board.kpis(&id)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&kpis)?);
        return Ok(());
    }

    if kpis.is_empty() {
        println!("{}", "No numeric columns with non-zero values.".dimmed());
        return Ok(());
    }

    println!("{}", "KPIs:".cyan().bold());
    for kpi in &kpis {
        let change = format!("{:+.2}%", kpi.change_percent);
        let trend = match kpi.trend {
            Trend::Up => format!("▲ {}", change).green(),
            Trend::Down => format!("▼ {}", change).red(),
            Trend::Stable => format!("■ {}", change).yellow(),
        };
        println!(
            "  {:<20} {}{:<12} target {}{}  {}",
            kpi.name.white().bold(),
            kpi.unit,
            kpi.value,
            kpi.unit,
            kpi.target,
            trend
        );
    }

    Ok(())
}
