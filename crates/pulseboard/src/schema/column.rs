//! Per-column metadata.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Maximum length (in characters) of a column description.
pub const MAX_DESCRIPTION_CHARS: usize = 60;

/// Semantic type and description for a single column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Resolved semantic type (inferred or overridden).
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Free-text description, at most 60 characters.
    #[serde(default)]
    pub description: String,
    /// Whether the type was set by a user rather than inferred.
    #[serde(default)]
    pub overridden: bool,
}

impl ColumnMeta {
    /// Metadata for an inferred type.
    pub fn inferred(column_type: ColumnType) -> Self {
        Self {
            column_type,
            description: String::new(),
            overridden: false,
        }
    }

    /// Override the inferred type.
    pub fn set_type(&mut self, column_type: ColumnType) {
        self.column_type = column_type;
        self.overridden = true;
    }

    /// Set the description, truncating to the character limit.
    pub fn set_description(&mut self, description: &str) {
        self.description = truncate_description(description);
    }
}

/// Trim and cut a description to [`MAX_DESCRIPTION_CHARS`] characters.
pub fn truncate_description(description: &str) -> String {
    description.trim().chars().take(MAX_DESCRIPTION_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_truncated_on_char_boundary() {
        let mut meta = ColumnMeta::inferred(ColumnType::Number);
        meta.set_description(&"é".repeat(80));
        assert_eq!(meta.description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_override_marks_meta() {
        let mut meta = ColumnMeta::inferred(ColumnType::String);
        assert!(!meta.overridden);
        meta.set_type(ColumnType::Number);
        assert!(meta.overridden);
        assert_eq!(meta.column_type, ColumnType::Number);
    }

    #[test]
    fn test_serializes_type_key() {
        let meta = ColumnMeta::inferred(ColumnType::Date);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "date");
    }
}
