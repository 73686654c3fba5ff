//! CLI argument definitions using clap.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use pulseboard::{Aggregation, ChartType, ColumnType, DateGrouping, ViewMode};

/// Pulseboard: analytics dashboard data core
#[derive(Parser)]
#[command(name = "pulseboard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override an inferred column type before commit (repeatable)
    #[arg(long = "type", value_name = "COLUMN=TYPE", global = true)]
    pub types: Vec<TypeOverride>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show columns, inferred types and a normalized preview
    Inspect {
        /// Path to the data file (CSV/JSON/XLS/XLSX)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of preview rows
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive KPIs for the numeric columns
    Kpis {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a chart frame and write it as JSON
    Chart {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column for the x-axis
        #[arg(short, long)]
        x: Option<String>,

        /// Columns for the y-axis (comma-separated; default: all numeric)
        #[arg(short, long, value_delimiter = ',')]
        y: Vec<String>,

        /// Chart type (bar, line, area, pie, scatter)
        #[arg(long, default_value = "bar")]
        chart_type: ChartType,

        /// View mode (all, top5, bottom5)
        #[arg(long, default_value = "all")]
        view: ViewMode,

        /// Entries shown in the `all` view (20, 50, 100, 250, 500, 1000)
        #[arg(long, default_value = "50")]
        entries: usize,

        /// Inclusive lower bound for a column (repeatable)
        #[arg(long, value_name = "COLUMN=VALUE")]
        min: Vec<Bound>,

        /// Inclusive upper bound for a column (repeatable)
        #[arg(long, value_name = "COLUMN=VALUE")]
        max: Vec<Bound>,

        /// Time bucket for a date x-axis (none, day, week, month)
        #[arg(long, default_value = "none")]
        group_by: DateGrouping,

        /// Aggregation within buckets (sum, min, max, median, average, none)
        #[arg(long, default_value = "average")]
        aggregate: Aggregation,

        /// Restrict to an inclusive position range, e.g. 10..20
        #[arg(long, value_name = "START..END")]
        brush: Option<BrushArg>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask the AI collaborator about a dataset
    Insight {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// LLM provider to use
        #[arg(long, default_value = "anthropic")]
        llm: LlmProviderChoice,

        /// Model to use (provider-specific, e.g., "gpt-4o")
        #[arg(long)]
        model: Option<String>,

        /// Ask a question instead of requesting general insights
        #[arg(short, long)]
        question: Option<String>,

        /// Recommend a chart type
        #[arg(long)]
        predict_chart: bool,

        /// Suggest column descriptions
        #[arg(long)]
        describe: bool,

        /// Sample rows sent with the request (5-10)
        #[arg(long, default_value = "5")]
        sample_rows: usize,

        /// Credential file (default: ~/.pulseboard/credentials.json)
        #[arg(long)]
        credentials: Option<PathBuf>,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,

        /// Credential file (default: ~/.pulseboard/credentials.json)
        #[arg(long)]
        credentials: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Store an API key
    Set {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Remove the stored key
    Clear,
    /// Show whether a key is stored (masked)
    Show,
}

/// A `COLUMN=TYPE` override.
#[derive(Clone, Debug)]
pub struct TypeOverride {
    pub column: String,
    pub column_type: ColumnType,
}

impl FromStr for TypeOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, ty) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("Expected COLUMN=TYPE, got '{}'", s))?;
        Ok(TypeOverride {
            column: column.trim().to_string(),
            column_type: ty.parse()?,
        })
    }
}

/// A `COLUMN=VALUE` numeric bound.
#[derive(Clone, Debug)]
pub struct Bound {
    pub column: String,
    pub value: f64,
}

impl FromStr for Bound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, value) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("Expected COLUMN=VALUE, got '{}'", s))?;
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("Invalid bound '{}': {}", value, e))?;
        Ok(Bound {
            column: column.trim().to_string(),
            value,
        })
    }
}

/// A `START..END` brush range.
#[derive(Clone, Copy, Debug)]
pub struct BrushArg {
    pub start: usize,
    pub end: usize,
}

impl FromStr for BrushArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once("..")
            .ok_or_else(|| format!("Expected START..END, got '{}'", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| format!("Invalid brush bound '{}': {}", v, e))
        };
        Ok(BrushArg {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

/// LLM provider choice for insights
#[derive(Clone, Debug, Default)]
pub enum LlmProviderChoice {
    /// Anthropic Claude API
    #[default]
    Anthropic,
    /// OpenAI GPT API
    OpenAI,
    /// Mock provider for testing
    Mock,
}

impl FromStr for LlmProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmProviderChoice::Anthropic),
            "openai" | "gpt" => Ok(LlmProviderChoice::OpenAI),
            "mock" | "test" => Ok(LlmProviderChoice::Mock),
            _ => Err(format!(
                "Unknown provider: {}. Use: anthropic, openai, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for LlmProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderChoice::Anthropic => write!(f, "anthropic"),
            LlmProviderChoice::OpenAI => write!(f, "openai"),
            LlmProviderChoice::Mock => write!(f, "mock"),
        }
    }
}
