//! Dataset lifecycle: an editable import draft, the committed dataset, and
//! the session store holding committed datasets.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::error::{PulseboardError, Result};
use crate::inference::TypeInference;
use crate::input::{RawTable, Row, SourceMetadata};
use crate::schema::{ColumnMeta, ColumnType};
use crate::transform::{NormalizedRow, Normalizer};

/// A parsed upload whose column metadata may still be edited.
#[derive(Debug, Clone)]
pub struct ImportDraft {
    name: String,
    table: RawTable,
    meta: IndexMap<String, ColumnMeta>,
    source: SourceMetadata,
}

impl ImportDraft {
    /// Start a draft with inferred column metadata.
    ///
    /// The display name is the file name without its extension.
    pub fn new(table: RawTable, source: SourceMetadata) -> Self {
        let meta = TypeInference::infer_table(&table);
        let name = Path::new(&source.file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "dataset".to_string());

        Self {
            name,
            table,
            meta,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.table.columns
    }

    pub fn meta(&self) -> &IndexMap<String, ColumnMeta> {
        &self.meta
    }

    pub fn source(&self) -> &SourceMetadata {
        &self.source
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Override the type of one column.
    pub fn set_column_type(&mut self, column: &str, column_type: ColumnType) -> Result<()> {
        self.column_mut(column)?.set_type(column_type);
        Ok(())
    }

    /// Set a column description, truncated to the character limit.
    pub fn set_description(&mut self, column: &str, description: &str) -> Result<()> {
        self.column_mut(column)?.set_description(description);
        Ok(())
    }

    /// First `n` rows normalized with the current metadata.
    pub fn preview(&self, n: usize) -> Vec<NormalizedRow> {
        let end = n.min(self.table.rows.len());
        Normalizer::normalize_rows(&self.table.columns, &self.table.rows[..end], &self.meta)
    }

    /// Freeze the draft into an immutable dataset.
    pub fn commit(self) -> Dataset {
        let normalized = Normalizer::normalize(&self.table, &self.meta);
        let dataset = Dataset {
            id: new_dataset_id(),
            name: self.name,
            created_at: Utc::now(),
            source: self.source,
            columns: self.table.columns,
            rows: self.table.rows,
            meta: self.meta,
            normalized,
        };
        info!(
            id = %dataset.id,
            name = %dataset.name,
            rows = dataset.row_count(),
            columns = dataset.columns.len(),
            "committed dataset"
        );
        dataset
    }

    fn column_mut(&mut self, column: &str) -> Result<&mut ColumnMeta> {
        self.meta
            .get_mut(column)
            .ok_or_else(|| PulseboardError::UnknownColumn(column.to_string()))
    }
}

/// A committed dataset. Read-only after creation.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    source: SourceMetadata,
    columns: Vec<String>,
    #[serde(skip)]
    rows: Vec<Row>,
    meta: IndexMap<String, ColumnMeta>,
    #[serde(skip)]
    normalized: Vec<NormalizedRow>,
}

impl Dataset {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn source(&self) -> &SourceMetadata {
        &self.source
    }

    /// Column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw rows as parsed.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn meta(&self) -> &IndexMap<String, ColumnMeta> {
        &self.meta
    }

    /// Rows coerced to the committed column types.
    pub fn normalized(&self) -> &[NormalizedRow] {
        &self.normalized
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

fn new_dataset_id() -> String {
    format!(
        "ds-{}-{:04x}",
        Utc::now().timestamp_millis(),
        fastrand::u16(..)
    )
}

/// Committed datasets of the current session, in insertion order.
#[derive(Debug, Default)]
pub struct DatasetStore {
    datasets: Vec<Dataset>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset and return its id.
    pub fn add(&mut self, dataset: Dataset) -> String {
        let id = dataset.id.clone();
        self.datasets.push(dataset);
        id
    }

    pub fn get(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn list(&self) -> &[Dataset] {
        &self.datasets
    }

    /// Most recently added dataset.
    pub fn latest(&self) -> Option<&Dataset> {
        self.datasets.last()
    }

    pub fn remove(&mut self, id: &str) -> Option<Dataset> {
        let pos = self.datasets.iter().position(|d| d.id == id)?;
        Some(self.datasets.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Parser;
    use crate::transform::CellValue;

    fn draft(csv: &str) -> ImportDraft {
        let (table, source) = Parser::new()
            .parse_bytes("sales_q1.csv", csv.as_bytes(), None)
            .unwrap();
        ImportDraft::new(table, source)
    }

    #[test]
    fn test_draft_infers_and_names() {
        let draft = draft("date,amount,region\n2024-01-01,10,EU\n2024-01-02,20,US\n");
        assert_eq!(draft.name(), "sales_q1");
        assert_eq!(draft.meta()["date"].column_type, ColumnType::Date);
        assert_eq!(draft.meta()["amount"].column_type, ColumnType::Number);
        assert_eq!(draft.meta()["region"].column_type, ColumnType::String);
    }

    #[test]
    fn test_preview_reflects_overrides() {
        let mut draft = draft("code,amount\n007,10\n");
        assert_eq!(
            draft.preview(5)[0].get("code"),
            Some(&CellValue::Number(7.0))
        );

        draft.set_column_type("code", ColumnType::Boolean).unwrap();
        assert_eq!(
            draft.preview(5)[0].get("code"),
            Some(&CellValue::Boolean(true))
        );
    }

    #[test]
    fn test_edit_unknown_column_fails() {
        let mut draft = draft("a\n1\n");
        let err = draft.set_description("missing", "x").unwrap_err();
        assert!(matches!(err, PulseboardError::UnknownColumn(_)));
    }

    #[test]
    fn test_commit_freezes_metadata() {
        let mut draft = draft("amount,note\n5,hi\nn/a,\n");
        draft.set_description("amount", "Order amount in EUR").unwrap();
        let dataset = draft.commit();

        assert!(dataset.id().starts_with("ds-"));
        assert_eq!(dataset.columns(), &["amount".to_string(), "note".to_string()]);
        assert_eq!(dataset.meta()["amount"].description, "Order amount in EUR");
        assert_eq!(dataset.normalized().len(), 2);
        assert_eq!(dataset.normalized()[1].number("amount"), Some(0.0));
    }

    #[test]
    fn test_store_lifecycle() {
        let mut store = DatasetStore::new();
        let first = store.add(draft("a\n1\n").commit());
        let second = store.add(draft("b\n2\n").commit());

        assert_eq!(store.len(), 2);
        assert_eq!(store.latest().map(|d| d.id()), Some(second.as_str()));
        assert!(store.get(&first).is_some());

        let removed = store.remove(&first).unwrap();
        assert_eq!(removed.columns(), &["a".to_string()]);
        assert!(store.get(&first).is_none());
        assert!(store.remove("ds-missing").is_none());
    }
}
