//! Pulseboard CLI - analytics dashboard data core.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = cli.types;
    let result = match cli.command {
        Commands::Inspect { file, rows, json } => {
            commands::inspect::run(file, rows, json, &overrides)
        }

        Commands::Kpis { file, json } => commands::kpis::run(file, json, &overrides),

        Commands::Chart {
            file,
            x,
            y,
            chart_type,
            view,
            entries,
            min,
            max,
            group_by,
            aggregate,
            brush,
            output,
        } => {
            let args = commands::chart::ChartArgs {
                x,
                y,
                chart_type,
                view,
                entries,
                min,
                max,
                group_by,
                aggregate,
                brush,
            };
            commands::chart::run(file, args, output, &overrides)
        }

        Commands::Insight {
            file,
            llm,
            model,
            question,
            predict_chart,
            describe,
            sample_rows,
            credentials,
        } => {
            let request = commands::insight::InsightRequest {
                question,
                predict_chart,
                describe,
                sample_rows,
            };
            commands::insight::run(file, llm, model, request, credentials, &overrides)
        }

        Commands::Key {
            action,
            credentials,
        } => commands::key::run(action, credentials),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise debug with `--verbose`, warn by default.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "pulseboard=debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
