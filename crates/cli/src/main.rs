use anyhow::Result;
use clap::{Parser, Subcommand};
use common::{init_structured_logging, LoggingConfig};
use std::process::ExitCode;

mod commands;
mod progress;
mod render;

use commands::{CheckConfigCommand, EvaluateCommand, InsightsCommand};

#[derive(Parser)]
#[command(name = "kpi-insight")]
#[command(about = "KPI fact enrichment and LLM insight generation")]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace). RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a KPI definitions file and list KPIs by subject area
    CheckConfig(CheckConfigCommand),
    /// Enrich observations and print the resulting facts
    Evaluate(EvaluateCommand),
    /// Enrich observations and generate LLM insights for one tab
    Insights(InsightsCommand),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let logging = LoggingConfig::default()
        .with_level(&cli.log_level)?
        .with_json_output(cli.json_logs)
        .with_color(console::colors_enabled_stderr());
    init_structured_logging(logging)?;

    match cli.command {
        Commands::CheckConfig(cmd) => cmd.execute(),
        Commands::Evaluate(cmd) => cmd.execute(),
        Commands::Insights(cmd) => cmd.execute().await,
    }
}
