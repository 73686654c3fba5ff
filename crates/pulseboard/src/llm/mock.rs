//! Mock provider for tests and offline use.

use std::sync::Mutex;

use crate::error::{PulseboardError, Result};

use super::prompts::{TASK_CHART_TYPE, TASK_DESCRIPTIONS, TASK_INSIGHTS, TASK_QUESTION};
use super::provider::{InsightProvider, LlmConfig};

/// Provider that answers from canned replies without network access.
///
/// By default the reply depends on the task heading in the prompt. A fixed
/// reply or a failure can be configured instead. Every prompt received is
/// recorded.
pub struct MockProvider {
    config: LlmConfig,
    reply: Option<String>,
    failure: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self::with_config(LlmConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: LlmConfig) -> Self {
        Self {
            config,
            reply: None,
            failure: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `reply`.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// Fail every request with a collaborator error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn canned(prompt: &str) -> String {
        if prompt.contains(TASK_CHART_TYPE) {
            "line".to_string()
        } else if prompt.contains(TASK_DESCRIPTIONS) {
            // Describe every listed column generically
            let columns: Vec<String> = prompt
                .lines()
                .skip_while(|l| !l.starts_with("## Columns"))
                .skip(1)
                .take_while(|l| l.starts_with("- "))
                .filter_map(|l| l[2..].split(" (").next())
                .map(|name| format!("\"{}\": \"Values of {}\"", name, name))
                .collect();
            format!("{{{}}}", columns.join(", "))
        } else if prompt.contains(TASK_QUESTION) {
            "Based on the sample rows, the values are stable.".to_string()
        } else if prompt.contains(TASK_INSIGHTS) {
            "- The dataset looks consistent.\n- No obvious anomalies in the sample.".to_string()
        } else {
            "OK".to_string()
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightProvider for MockProvider {
    fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(message) = &self.failure {
            return Err(PulseboardError::Collaborator(message.clone()));
        }

        Ok(self.reply.clone().unwrap_or_else(|| Self::canned(prompt)))
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::parse_json_response;
    use std::collections::HashMap;

    #[test]
    fn test_canned_reply_by_task() {
        let mock = MockProvider::new();
        let reply = mock.complete(&format!("ctx\n{}\n", TASK_CHART_TYPE)).unwrap();
        assert_eq!(reply, "line");
        assert_eq!(mock.prompts().len(), 1);
    }

    #[test]
    fn test_canned_descriptions_are_json() {
        let prompt = format!(
            "## Columns\n- date (date)\n- revenue (number): Sales\n\n{}",
            TASK_DESCRIPTIONS
        );
        let reply = MockProvider::new().complete(&prompt).unwrap();
        let parsed: HashMap<String, String> = parse_json_response(&reply).unwrap();
        assert_eq!(parsed["revenue"], "Values of revenue");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_fixed_reply_and_failure() {
        assert_eq!(MockProvider::new().with_reply("pie").complete("x").unwrap(), "pie");

        let failing = MockProvider::failing("401 unauthorized");
        let err = failing.complete("x").unwrap_err();
        assert!(matches!(err, PulseboardError::Collaborator(m) if m == "401 unauthorized"));
        assert_eq!(failing.prompts(), vec!["x".to_string()]);
    }
}
