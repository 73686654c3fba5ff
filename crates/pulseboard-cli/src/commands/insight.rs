//! Insight command - ask the AI collaborator about a dataset.

use std::path::PathBuf;

use colored::Colorize;
use pulseboard::{
    AnthropicProvider, Assisted, CredentialStore, LlmConfig, MockProvider, OpenAIProvider,
    Pulseboard, PulseboardConfig,
};

use super::{CommandResult, commit_with_overrides, credential_store};
use crate::cli::{LlmProviderChoice, TypeOverride};

/// What to ask for.
pub struct InsightRequest {
    pub question: Option<String>,
    pub predict_chart: bool,
    pub describe: bool,
    pub sample_rows: usize,
}

pub fn run(
    file: PathBuf,
    llm: LlmProviderChoice,
    model: Option<String>,
    request: InsightRequest,
    credentials: Option<PathBuf>,
    overrides: &[TypeOverride],
) -> CommandResult {
    let config = PulseboardConfig::default().with_ai_sample_rows(request.sample_rows);
    let board = Pulseboard::with_config(config);
    let mut board = match llm {
        LlmProviderChoice::Mock => board.with_llm(MockProvider::new()),
        LlmProviderChoice::Anthropic => {
            let key = resolve_key(credentials, "ANTHROPIC_API_KEY")?;
            let mut cfg = LlmConfig::default();
            if let Some(m) = model {
                cfg.model = m;
            }
            board.with_llm(AnthropicProvider::with_config(key, cfg)?)
        }
        LlmProviderChoice::OpenAI => {
            let key = resolve_key(credentials, "OPENAI_API_KEY")?;
            let provider = match model {
                Some(m) => OpenAIProvider::with_config(
                    key,
                    LlmConfig {
                        model: m,
                        ..LlmConfig::default()
                    },
                )?,
                None => OpenAIProvider::new(key)?,
            };
            board.with_llm(provider)
        }
    };

    let id = commit_with_overrides(&mut board, &file, overrides)?;
    let dataset = board
        .dataset(&id)
        .ok_or("Dataset disappeared after commit")?;
    let service = board.insights().ok_or("No insight provider configured")?;

    eprintln!(
        "{} {} ({} rows) with {}",
        "Asking about".cyan(),
        dataset.name().white().bold(),
        dataset.row_count(),
        service.provider_name()
    );

    if request.predict_chart {
        let chart = service.predict_chart_type(dataset);
        report_degraded(&chart);
        println!("{} {}", "Suggested chart:".yellow().bold(), chart.value);
    }

    if request.describe {
        let descriptions = service.suggest_descriptions(dataset);
        report_degraded(&descriptions);
        println!("{}", "Column descriptions:".yellow().bold());
        for (column, description) in &descriptions.value {
            println!("  {}: {}", column.white().bold(), description);
        }
    }

    if let Some(question) = request.question {
        let answer = service.answer_question(dataset, &question);
        report_degraded(&answer);
        println!("{}", answer.value);
    } else if !request.predict_chart && !request.describe {
        let insights = service.generate_insights(dataset);
        report_degraded(&insights);
        println!("{}", insights.value);
    }

    Ok(())
}

/// Stored credential first, then the provider's environment variable.
fn resolve_key(credentials: Option<PathBuf>, env_var: &str) -> CommandResult<String> {
    if let Some(key) = credential_store(credentials)?.load()? {
        return Ok(key);
    }
    std::env::var(env_var).map_err(|_| {
        format!(
            "No API key found. Run 'pulseboard key set <KEY>' or set {}.",
            env_var
        )
        .into()
    })
}

fn report_degraded<T>(result: &Assisted<T>) {
    if let Some(error) = &result.error {
        eprintln!("{} {}", "Warning: AI request failed:".yellow(), error);
    }
}
