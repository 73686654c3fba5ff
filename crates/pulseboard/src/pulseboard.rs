//! Main Pulseboard struct and public API.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::PulseboardConfig;
use crate::dataset::{Dataset, DatasetStore, ImportDraft};
use crate::error::{PulseboardError, Result};
use crate::input::Parser;
use crate::kpi::{Kpi, KpiDeriver};
use crate::llm::{InsightProvider, InsightService};
use crate::summary::DatasetSummary;
use crate::transform::{Brush, ChartEngine, ChartFrame, ChartSettings};

/// A dashboard session: imports, committed datasets and derived views.
pub struct Pulseboard {
    config: PulseboardConfig,
    parser: Parser,
    engine: ChartEngine,
    kpis: KpiDeriver,
    store: DatasetStore,
    insights: Option<InsightService>,
}

impl Pulseboard {
    /// Create a session with default configuration.
    pub fn new() -> Self {
        Self::with_config(PulseboardConfig::default())
    }

    /// Create a session with custom configuration.
    pub fn with_config(config: PulseboardConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        let engine = ChartEngine::with_max_points(config.max_chart_points);
        let kpis = KpiDeriver::with_max_kpis(config.max_kpis);

        Self {
            config,
            parser,
            engine,
            kpis,
            store: DatasetStore::new(),
            insights: None,
        }
    }

    /// Attach an insight provider.
    pub fn with_llm(mut self, provider: impl InsightProvider + 'static) -> Self {
        let service = InsightService::new(Arc::new(provider))
            .with_sample_rows(self.config.ai_sample_rows());
        self.insights = Some(service);
        self
    }

    pub fn config(&self) -> &PulseboardConfig {
        &self.config
    }

    /// Parse a file into an editable draft.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportDraft> {
        let (table, source) = self.parser.parse_file(path)?;
        info!(file = %source.file, format = %source.format, rows = source.row_count, "imported file");
        Ok(ImportDraft::new(table, source))
    }

    /// Parse an in-memory upload into an editable draft.
    pub fn import_bytes(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime: Option<&str>,
    ) -> Result<ImportDraft> {
        let (table, source) = self.parser.parse_bytes(file_name, bytes, mime)?;
        info!(file = %source.file, format = %source.format, rows = source.row_count, "imported upload");
        Ok(ImportDraft::new(table, source))
    }

    /// Commit a draft and add it to the session. Returns the dataset id.
    pub fn commit(&mut self, draft: ImportDraft) -> String {
        self.store.add(draft.commit())
    }

    /// Import and commit a file with inferred types.
    pub fn import_and_commit(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let draft = self.import_file(path)?;
        Ok(self.commit(draft))
    }

    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.store.get(id)
    }

    pub fn datasets(&self) -> &[Dataset] {
        self.store.list()
    }

    pub fn remove_dataset(&mut self, id: &str) -> Option<Dataset> {
        self.store.remove(id)
    }

    /// KPIs for a committed dataset.
    pub fn kpis(&self, id: &str) -> Result<Vec<Kpi>> {
        let dataset = self.require(id)?;
        Ok(self.kpis.derive(dataset.meta(), dataset.normalized()))
    }

    /// Chart frame for a committed dataset.
    pub fn chart(
        &self,
        id: &str,
        settings: &ChartSettings,
        brush: Option<Brush>,
    ) -> Result<ChartFrame> {
        let dataset = self.require(id)?;
        self.engine
            .build(dataset.meta(), dataset.normalized(), settings, brush)
    }

    /// Statistical summary of a committed dataset.
    pub fn summary(&self, id: &str) -> Result<DatasetSummary> {
        let dataset = self.require(id)?;
        Ok(DatasetSummary::compute(dataset.meta(), dataset.normalized()))
    }

    /// The insight service, if a provider is attached.
    pub fn insights(&self) -> Option<&InsightService> {
        self.insights.as_ref()
    }

    fn require(&self, id: &str) -> Result<&Dataset> {
        self.store
            .get(id)
            .ok_or_else(|| PulseboardError::UnknownDataset(id.to_string()))
    }
}

impl Default for Pulseboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockProvider;
    use crate::transform::ChartType;

    const CSV: &str = "month,revenue,cost\n2024-01-01,100,40\n2024-02-01,300,0\n";

    #[test]
    fn test_import_commit_and_derive() {
        let mut board = Pulseboard::new();
        let draft = board.import_bytes("q1.csv", CSV.as_bytes(), Some("text/csv")).unwrap();
        let id = board.commit(draft);

        let kpis = board.kpis(&id).unwrap();
        assert_eq!(kpis.len(), 2);
        assert_eq!(kpis[0].value, 200.0);
        assert_eq!(kpis[1].value, 40.0);

        let frame = board.chart(&id, &ChartSettings::default(), None).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(board.datasets().len(), 1);
    }

    #[test]
    fn test_unknown_dataset() {
        let board = Pulseboard::new();
        assert!(matches!(
            board.kpis("ds-0-0000"),
            Err(PulseboardError::UnknownDataset(_))
        ));
    }

    #[test]
    fn test_insights_use_configured_sample_size() {
        let mut csv = String::from("month,revenue\n");
        for day in 1..=12 {
            csv.push_str(&format!("2024-01-{:02},{}\n", day, day * 10));
        }

        let mock = Arc::new(MockProvider::new());
        let config = PulseboardConfig::default().with_ai_sample_rows(7);
        let mut board = Pulseboard::with_config(config).with_llm(mock.clone());
        let draft = board.import_bytes("jan.csv", csv.as_bytes(), None).unwrap();
        let id = board.commit(draft);

        let service = board.insights().unwrap();
        let dataset = board.dataset(&id).unwrap();
        assert_eq!(service.predict_chart_type(dataset).value, ChartType::Line);
        assert_eq!(service.provider_name(), "mock");

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        let samples = prompts[0]
            .lines()
            .skip_while(|l| !l.starts_with("## Sample Rows"))
            .skip(1)
            .take_while(|l| l.starts_with('{'))
            .count();
        assert_eq!(samples, 7);
    }
}
