//! Insight operations with graceful degradation.
//!
//! Collaborator failures never reach the caller as errors. Each operation
//! returns an [`Assisted`] value holding either the model's answer or a
//! default, along with the failure message.

use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AI_SAMPLE_ROWS_MAX, AI_SAMPLE_ROWS_MIN};
use crate::dataset::Dataset;
use crate::error::{PulseboardError, Result};
use crate::schema::truncate_description;
use crate::transform::ChartType;

use super::prompts;
use super::provider::{InsightProvider, parse_json_response};

const INSIGHTS_FALLBACK: &str =
    "AI insights are unavailable right now. Check the API key and try again.";
const ANSWER_FALLBACK: &str =
    "I couldn't reach the AI service to answer that. Please try again later.";

/// A collaborator result, or the default used in its place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assisted<T> {
    pub value: T,
    /// Why the default was used, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Assisted<T> {
    fn answered(value: T) -> Self {
        Self { value, error: None }
    }

    fn degraded(value: T, error: String) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    /// Whether the default was used.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Runs insight requests against a provider.
#[derive(Clone)]
pub struct InsightService {
    provider: Arc<dyn InsightProvider>,
    sample_rows: usize,
}

impl InsightService {
    pub fn new(provider: Arc<dyn InsightProvider>) -> Self {
        Self {
            provider,
            sample_rows: AI_SAMPLE_ROWS_MIN,
        }
    }

    /// Rows sent as samples with each request, clamped to 5..=10.
    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows.clamp(AI_SAMPLE_ROWS_MIN, AI_SAMPLE_ROWS_MAX);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Free-form insights about a dataset.
    pub fn generate_insights(&self, dataset: &Dataset) -> Assisted<String> {
        let prompt = prompts::insights_prompt(&self.context(dataset));
        self.run("insights", &prompt, |reply| Ok(reply.trim().to_string()))
            .unwrap_or_else(|e| Assisted::degraded(INSIGHTS_FALLBACK.to_string(), e))
    }

    /// Answer a user question about a dataset.
    pub fn answer_question(&self, dataset: &Dataset, question: &str) -> Assisted<String> {
        let prompt = prompts::question_prompt(&self.context(dataset), question.trim());
        self.run("question", &prompt, |reply| Ok(reply.trim().to_string()))
            .unwrap_or_else(|e| Assisted::degraded(ANSWER_FALLBACK.to_string(), e))
    }

    /// Recommend a chart type. Defaults to bar.
    pub fn predict_chart_type(&self, dataset: &Dataset) -> Assisted<ChartType> {
        let prompt = prompts::chart_type_prompt(&self.context(dataset));
        self.run("chart type", &prompt, |reply| {
            ChartType::from_str(reply).map_err(PulseboardError::Collaborator)
        })
        .unwrap_or_else(|e| Assisted::degraded(ChartType::default(), e))
    }

    /// Suggest column descriptions, truncated to the description limit.
    ///
    /// Names that are not columns of the dataset are dropped.
    pub fn suggest_descriptions(&self, dataset: &Dataset) -> Assisted<IndexMap<String, String>> {
        let prompt = prompts::descriptions_prompt(&self.context(dataset));
        self.run("descriptions", &prompt, |reply| {
            let parsed: IndexMap<String, String> = parse_json_response(reply)?;
            Ok(parsed
                .into_iter()
                .filter(|(column, _)| dataset.meta().contains_key(column))
                .map(|(column, description)| (column, truncate_description(&description)))
                .collect())
        })
        .unwrap_or_else(|e| Assisted::degraded(IndexMap::new(), e))
    }

    fn context(&self, dataset: &Dataset) -> String {
        prompts::dataset_context(dataset, self.sample_rows)
    }

    fn run<T>(
        &self,
        task: &str,
        prompt: &str,
        interpret: impl FnOnce(&str) -> Result<T>,
    ) -> std::result::Result<Assisted<T>, String> {
        let outcome = self.provider.complete(prompt).and_then(|reply| interpret(&reply));
        match outcome {
            Ok(value) => {
                info!(provider = self.provider.name(), task, "collaborator answered");
                Ok(Assisted::answered(value))
            }
            Err(e) => {
                warn!(provider = self.provider.name(), task, error = %e, "collaborator failed, using default");
                Err(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ImportDraft;
    use crate::input::Parser;
    use crate::llm::MockProvider;

    fn dataset() -> Dataset {
        let csv = "date,revenue\n2024-01-01,100\n2024-01-02,150\n";
        let (table, source) = Parser::new()
            .parse_bytes("daily.csv", csv.as_bytes(), None)
            .unwrap();
        ImportDraft::new(table, source).commit()
    }

    fn service(provider: MockProvider) -> InsightService {
        InsightService::new(Arc::new(provider))
    }

    fn sample_lines(prompt: &str) -> usize {
        prompt
            .lines()
            .skip_while(|l| !l.starts_with("## Sample Rows"))
            .skip(1)
            .take_while(|l| l.starts_with('{'))
            .count()
    }

    #[test]
    fn test_sample_rows_are_clamped() {
        let mut csv = String::from("n\n");
        for i in 1..=20 {
            csv.push_str(&format!("{}\n", i));
        }
        let (table, source) = Parser::new()
            .parse_bytes("n.csv", csv.as_bytes(), None)
            .unwrap();
        let ds = ImportDraft::new(table, source).commit();

        for (requested, sent) in [(1, 5), (7, 7), (50, 10)] {
            let mock = Arc::new(MockProvider::new());
            let svc = InsightService::new(mock.clone()).with_sample_rows(requested);
            svc.generate_insights(&ds);
            assert_eq!(sample_lines(&mock.prompts()[0]), sent);
        }
    }

    #[test]
    fn test_insights_pass_through() {
        let result = service(MockProvider::new().with_reply("  Revenue grew 50%.  "))
            .generate_insights(&dataset());
        assert_eq!(result.value, "Revenue grew 50%.");
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_failures_degrade_to_defaults() {
        let svc = service(MockProvider::failing("network down"));
        let ds = dataset();

        let insights = svc.generate_insights(&ds);
        assert!(insights.is_degraded());
        assert_eq!(insights.value, INSIGHTS_FALLBACK);

        let answer = svc.answer_question(&ds, "What happened?");
        assert_eq!(answer.value, ANSWER_FALLBACK);

        let chart = svc.predict_chart_type(&ds);
        assert_eq!(chart.value, ChartType::Bar);
        assert!(chart.error.as_deref().is_some_and(|e| e.contains("network down")));

        assert!(svc.suggest_descriptions(&ds).value.is_empty());
    }

    #[test]
    fn test_chart_prediction_parses_reply() {
        let ds = dataset();
        assert_eq!(service(MockProvider::new()).predict_chart_type(&ds).value, ChartType::Line);

        let vague = service(MockProvider::new().with_reply("Probably a scatter plot."));
        assert_eq!(vague.predict_chart_type(&ds).value, ChartType::Scatter);

        let nonsense = service(MockProvider::new().with_reply("a table"));
        let result = nonsense.predict_chart_type(&ds);
        assert_eq!(result.value, ChartType::Bar);
        assert!(result.is_degraded());
    }

    #[test]
    fn test_descriptions_are_filtered_and_truncated() {
        let reply = format!(
            r#"{{"revenue": "{}", "ghost": "not a column"}}"#,
            "x".repeat(100)
        );
        let result = service(MockProvider::new().with_reply(reply)).suggest_descriptions(&dataset());

        assert_eq!(result.value.len(), 1);
        assert_eq!(result.value["revenue"].chars().count(), 60);
    }

    #[test]
    fn test_prompt_includes_dataset_context() {
        let mock = Arc::new(MockProvider::new());
        let svc = InsightService::new(mock.clone());
        svc.answer_question(&dataset(), "  Best day?  ");

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- Name: daily"));
        assert!(prompts[0].ends_with("Question: Best day?"));
    }
}
