//! Inspect command - show columns, types and a normalized preview.

use std::path::PathBuf;

use colored::Colorize;
use indexmap::IndexMap;
use pulseboard::transform::NormalizedRow;
use pulseboard::{ColumnMeta, Pulseboard, SourceMetadata};
use serde::Serialize;

use super::{CommandResult, draft_with_overrides};
use crate::cli::TypeOverride;

#[derive(Serialize)]
struct InspectReport<'a> {
    name: &'a str,
    source: &'a SourceMetadata,
    columns: &'a IndexMap<String, ColumnMeta>,
    preview: &'a [NormalizedRow],
}

pub fn run(file: PathBuf, rows: usize, json_output: bool, overrides: &[TypeOverride]) -> CommandResult {
    let board = Pulseboard::new();
    let draft = draft_with_overrides(&board, &file, overrides)?;
    let preview = draft.preview(rows);

    if json_output {
        let report = InspectReport {
            name: draft.name(),
            source: draft.source(),
            columns: draft.meta(),
            preview: &preview,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let source = draft.source();
    println!("{} {}", "Dataset".cyan().bold(), draft.name().white().bold());
    println!(
        "  {} rows, {} columns, {} ({} bytes)",
        source.row_count, source.column_count, source.format, source.size_bytes
    );
    println!();

    println!("{}", "Columns:".yellow().bold());
    let width = draft.columns().iter().map(|c| c.len()).max().unwrap_or(0);
    for (name, meta) in draft.meta() {
        let ty = if meta.overridden {
            format!("{} (override)", meta.column_type).magenta()
        } else {
            meta.column_type.to_string().green()
        };
        println!("  {:width$}  {}", name, ty, width = width);
    }
    println!();

    if preview.is_empty() {
        println!("{}", "No rows to preview.".dimmed());
        return Ok(());
    }

    println!("{}", format!("Preview ({} rows):", preview.len()).yellow().bold());
    println!("  {}", draft.columns().join(" | ").bold());
    for row in &preview {
        let cells: Vec<String> = row.cells.values().map(|c| c.to_string()).collect();
        println!("  {}", cells.join(" | "));
    }

    Ok(())
}
