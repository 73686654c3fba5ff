//! Input format detection from MIME type and file name.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Csv,
    Json,
    /// Legacy binary Excel workbook.
    Xls,
    /// Office Open XML workbook.
    Xlsx,
}

impl InputFormat {
    /// Map a MIME type to a format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            "text/csv" | "application/csv" => Some(InputFormat::Csv),
            "application/json" | "text/json" => Some(InputFormat::Json),
            "application/vnd.ms-excel" => Some(InputFormat::Xls),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(InputFormat::Xlsx)
            }
            _ => None,
        }
    }

    /// Map a file extension (without dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(InputFormat::Csv),
            "json" => Some(InputFormat::Json),
            "xls" => Some(InputFormat::Xls),
            "xlsx" => Some(InputFormat::Xlsx),
            _ => None,
        }
    }

    /// Resolve the format of an upload.
    ///
    /// A recognized extension wins, then a declared MIME type, then the
    /// MIME type guessed from the file name. Anything unrecognized parses as
    /// CSV.
    ///
    /// Browsers on Windows declare `.csv` files as
    /// `application/vnd.ms-excel`, so the declared type cannot override the
    /// extension.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Self {
        let by_extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension);
        if let Some(format) = by_extension {
            return format;
        }

        if let Some(format) = mime.and_then(Self::from_mime) {
            return format;
        }

        mime_guess::from_path(file_name)
            .first_raw()
            .and_then(Self::from_mime)
            .unwrap_or(InputFormat::Csv)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Csv => "csv",
            InputFormat::Json => "json",
            InputFormat::Xls => "xls",
            InputFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
