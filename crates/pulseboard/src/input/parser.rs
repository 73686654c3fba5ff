//! CSV, JSON and spreadsheet parsers producing a uniform [`RawTable`].

use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use calamine::{DataType, Range, Reader, Xls, Xlsx};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::format::InputFormat;
use super::source::{RawTable, RawValue, Row, SourceMetadata};
use crate::error::{PulseboardError, Result, RowError, RowErrorKind};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b',', b'\t', b';', b'|'];

/// Numeric literal accepted by dynamic typing.
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*-?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?\s*$").unwrap()
});

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// CSV delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Convert numeric and boolean CSV literals to typed values.
    pub dynamic_typing: bool,
    /// CSV quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            dynamic_typing: true,
            quote: b'"',
        }
    }
}

/// Parses uploaded tabular files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Read and parse a file, detecting the format from its name.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(RawTable, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| PulseboardError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.parse_bytes(&file_name, &contents, None)
    }

    /// Parse an in-memory upload.
    ///
    /// `mime` is the declared content type, if any; the file name is used
    /// otherwise. Unrecognized inputs are parsed as CSV.
    pub fn parse_bytes(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime: Option<&str>,
    ) -> Result<(RawTable, SourceMetadata)> {
        let format = InputFormat::detect(file_name, mime);
        let table = self.parse_as(bytes, format)?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        if table.is_empty() {
            warn!(file = file_name, %format, "parsed input holds no data");
        }
        debug!(
            file = file_name,
            %format,
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed input"
        );

        let metadata = SourceMetadata::new(file_name, hash, bytes.len() as u64, format, &table);
        Ok((table, metadata))
    }

    /// Parse bytes with an explicit format.
    pub fn parse_as(&self, bytes: &[u8], format: InputFormat) -> Result<RawTable> {
        match format {
            InputFormat::Csv => self.parse_csv(bytes),
            InputFormat::Json => parse_json(bytes),
            InputFormat::Xls | InputFormat::Xlsx => parse_spreadsheet(bytes, format),
        }
    }

    /// Parse delimited text. Any row-level failure aborts the whole parse.
    fn parse_csv(&self, bytes: &[u8]) -> Result<RawTable> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes),
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = match reader.headers() {
            Ok(record) => record.iter().map(|s| s.to_string()).collect(),
            Err(e) => {
                return Err(PulseboardError::Parse {
                    format: InputFormat::Csv.to_string(),
                    errors: vec![RowError {
                        row: 0,
                        kind: RowErrorKind::Malformed,
                        message: format!("unreadable header: {}", e),
                    }],
                });
            }
        };
        let columns = unique_headers(headers);

        let mut rows = Vec::new();
        let mut errors = Vec::new();
        let mut row_number = 0;

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    row_number += 1;
                    errors.push(RowError {
                        row: row_number,
                        kind: RowErrorKind::Malformed,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            // Whitespace-only lines count as blank.
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            row_number += 1;

            if record.len() != columns.len() {
                let kind = if record.len() < columns.len() {
                    RowErrorKind::TooFewFields
                } else {
                    RowErrorKind::TooManyFields
                };
                errors.push(RowError {
                    row: row_number,
                    kind,
                    message: format!(
                        "expected {} fields, found {}",
                        columns.len(),
                        record.len()
                    ),
                });
                continue;
            }

            let row: Row = columns
                .iter()
                .zip(record.iter())
                .map(|(col, field)| (col.clone(), self.csv_cell(field)))
                .collect();
            rows.push(row);
        }

        if !errors.is_empty() {
            return Err(PulseboardError::Parse {
                format: InputFormat::Csv.to_string(),
                errors,
            });
        }

        Ok(RawTable::new(columns, rows))
    }

    fn csv_cell(&self, field: &str) -> RawValue {
        if !self.config.dynamic_typing {
            return RawValue::Text(field.to_string());
        }
        match field {
            "true" | "TRUE" => RawValue::Bool(true),
            "false" | "FALSE" => RawValue::Bool(false),
            _ if NUMERIC_LITERAL.is_match(field) => field
                .trim()
                .parse::<f64>()
                .map(RawValue::Number)
                .unwrap_or_else(|_| RawValue::Text(field.to_string())),
            _ => RawValue::Text(field.to_string()),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a JSON object (one row) or array of objects.
fn parse_json(bytes: &[u8]) -> Result<RawTable> {
    let root: serde_json::Value = serde_json::from_slice(bytes)?;

    let records = match root {
        serde_json::Value::Object(map) => vec![map],
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                serde_json::Value::Object(map) => Ok(map),
                other => Err(PulseboardError::Format {
                    format: InputFormat::Json.to_string(),
                    message: format!(
                        "array element {} is {}, expected an object",
                        i,
                        json_kind(&other)
                    ),
                }),
            })
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(PulseboardError::Format {
                format: InputFormat::Json.to_string(),
                message: format!(
                    "root is {}, expected an object or an array of objects",
                    json_kind(&other)
                ),
            });
        }
    };

    let columns: Vec<String> = records
        .first()
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();

    let rows = records
        .into_iter()
        .map(|record| {
            record
                .into_iter()
                .map(|(key, value)| (key, RawValue::from_json(value)))
                .collect::<Row>()
        })
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Parse the first worksheet of an Excel workbook.
fn parse_spreadsheet(bytes: &[u8], format: InputFormat) -> Result<RawTable> {
    let range = match format {
        InputFormat::Xls => {
            let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes))
                .map_err(|e| PulseboardError::Spreadsheet(e.to_string()))?;
            let names = workbook.sheet_names().to_vec();
            first_sheet(names, |name| {
                workbook
                    .worksheet_range(name)
                    .map(|r| r.map_err(|e| e.to_string()))
            })?
        }
        _ => {
            let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
                .map_err(|e| PulseboardError::Spreadsheet(e.to_string()))?;
            let names = workbook.sheet_names().to_vec();
            first_sheet(names, |name| {
                workbook
                    .worksheet_range(name)
                    .map(|r| r.map_err(|e| e.to_string()))
            })?
        }
    };

    Ok(table_from_range(&range))
}

fn first_sheet<F>(sheet_names: Vec<String>, mut load: F) -> Result<Range<DataType>>
where
    F: FnMut(&str) -> Option<std::result::Result<Range<DataType>, String>>,
{
    let name = sheet_names
        .first()
        .ok_or_else(|| PulseboardError::Spreadsheet("workbook has no sheets".to_string()))?;

    load(name)
        .ok_or_else(|| PulseboardError::Spreadsheet(format!("sheet '{}' is unreadable", name)))?
        .map_err(PulseboardError::Spreadsheet)
}

/// First row is the header; blank rows are skipped, empty cells become "".
fn table_from_range(range: &Range<DataType>) -> RawTable {
    let mut sheet_rows = range.rows();

    let headers: Vec<String> = match sheet_rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let name = cell_to_raw(cell).to_string().trim().to_string();
                if name.is_empty() {
                    format!("column_{}", i + 1)
                } else {
                    name
                }
            })
            .collect(),
        None => return RawTable::default(),
    };
    let headers = unique_headers(headers);

    let rows: Vec<Row> = sheet_rows
        .filter(|cells| !cells.iter().all(|c| matches!(c, DataType::Empty)))
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let value = cells.get(i).map(cell_to_raw).unwrap_or_else(RawValue::empty);
                    (col.clone(), value)
                })
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return RawTable::default();
    }

    RawTable::new(headers, rows)
}

fn cell_to_raw(cell: &DataType) -> RawValue {
    match cell {
        DataType::Empty => RawValue::empty(),
        DataType::String(s) => RawValue::Text(s.clone()),
        DataType::Float(v) => RawValue::Number(*v),
        DataType::Int(v) => RawValue::Number(*v as f64),
        DataType::Bool(v) => RawValue::Bool(*v),
        DataType::DateTime(v) => RawValue::Number(*v),
        DataType::Duration(v) => RawValue::Number(*v),
        DataType::DateTimeIso(s) => RawValue::Text(s.clone()),
        DataType::DurationIso(s) => RawValue::Text(s.clone()),
        DataType::Error(_) => RawValue::empty(),
    }
}

/// Strip a BOM and make duplicate names unique with `_1`, `_2`, ... suffixes.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = if i == 0 {
                name.trim_start_matches('\u{feff}').to_string()
            } else {
                name
            };
            let mut candidate = name.clone();
            let mut suffix = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{}_{}", name, suffix);
                suffix += 1;
            }
            candidate
        })
        .collect()
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let Some(&first_count) = counts.first() else {
            continue;
        };
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines beat a higher but ragged count
        let score = if counts.iter().all(|&c| c == first_count) {
            first_count * 1000
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
