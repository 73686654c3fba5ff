//! Insight provider trait and shared types.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{PulseboardError, Result};

/// Configuration for chat-completion providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
            temperature: 0.3,
        }
    }
}

/// A hosted (or mocked) chat-completion endpoint.
///
/// Implementations must be thread-safe (Send + Sync) so a provider can be
/// shared behind an `Arc`. Every failure, whether transport, auth or an
/// empty reply, is reported as [`PulseboardError::Collaborator`].
pub trait InsightProvider: Send + Sync {
    /// Send one user prompt and return the reply text.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging).
    fn name(&self) -> &str;
}

/// A shared provider, so callers can keep a handle to it.
impl<P: InsightProvider + ?Sized> InsightProvider for Arc<P> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }

    fn config(&self) -> &LlmConfig {
        (**self).config()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Parse JSON from a model reply, tolerating markdown code fences.
pub fn parse_json_response<T: for<'de> Deserialize<'de>>(response: &str) -> Result<T> {
    let json_str = if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .unwrap_or(response)
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .unwrap_or(response)
    } else {
        response.trim()
    };

    serde_json::from_str(json_str).map_err(|e| {
        PulseboardError::Collaborator(format!("Failed to parse model JSON response: {}", e))
    })
}
