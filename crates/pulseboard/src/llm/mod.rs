//! AI collaborator boundary.
//!
//! The pipeline never depends on a model. Insight requests go through
//! [`InsightService`], which turns every provider failure into a default
//! value (a fallback message, `bar` for chart prediction, no descriptions).
//!
//! # Supported Providers
//!
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY` or a stored key)
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY` or a stored key)
//! - **Mock** - canned replies, no network
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pulseboard::{AnthropicProvider, InsightService, Pulseboard};
//!
//! let mut board = Pulseboard::new();
//! let id = board.import_and_commit("sales.csv").unwrap();
//! let service = InsightService::new(Arc::new(AnthropicProvider::from_env().unwrap()));
//! let insights = service.generate_insights(board.dataset(&id).unwrap());
//! println!("{}", insights.value);
//! ```

mod anthropic;
mod mock;
mod openai;
mod prompts;
mod provider;
mod service;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use openai::OpenAIProvider;
pub use prompts::dataset_context;
pub use provider::{InsightProvider, LlmConfig, parse_json_response};
pub use service::{Assisted, InsightService};
