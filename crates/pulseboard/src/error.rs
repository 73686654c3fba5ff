//! Error types for the Pulseboard library.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of a row-level parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorKind {
    /// Row has fewer fields than the header.
    TooFewFields,
    /// Row has more fields than the header.
    TooManyFields,
    /// Row could not be tokenized (bad quoting, invalid UTF-8, ...).
    Malformed,
}

/// A single row-level parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub kind: RowErrorKind,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

fn summarize(errors: &[RowError]) -> String {
    let shown: Vec<String> = errors.iter().take(3).map(|e| e.to_string()).collect();
    let mut out = shown.join("; ");
    if errors.len() > 3 {
        out.push_str(&format!(" (and {} more)", errors.len() - 3));
    }
    out
}

/// Main error type for Pulseboard operations.
#[derive(Debug, Error)]
pub enum PulseboardError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more rows failed to parse; no dataset is produced.
    #[error("Failed to parse {format} input: {}", summarize(.errors))]
    Parse {
        format: String,
        errors: Vec<RowError>,
    },

    /// Input is syntactically valid but has the wrong shape.
    #[error("Invalid {format} input: {message}")]
    Format { format: String, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet could not be read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The AI collaborator failed (network, auth, malformed response).
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Referenced column does not exist in the dataset.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// No dataset with this id in the session.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}

impl PulseboardError {
    /// Name of the input format that failed, for parse-type errors.
    pub fn failed_format(&self) -> Option<&str> {
        match self {
            PulseboardError::Parse { format, .. } | PulseboardError::Format { format, .. } => {
                Some(format)
            }
            PulseboardError::Json(_) => Some("json"),
            PulseboardError::Spreadsheet(_) => Some("spreadsheet"),
            _ => None,
        }
    }
}

/// Result type alias for Pulseboard operations.
pub type Result<T> = std::result::Result<T, PulseboardError>;
