use super::load_inputs;
use crate::render;
use anyhow::Result;
use clap::{Args, ValueEnum};
use common::OperationTimer;
use domain::enrich_all;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EvaluateFormat {
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct EvaluateCommand {
    /// KPI definitions file (YAML or JSON)
    definitions: PathBuf,
    /// Observations file: a list of {kpi, current, prior}
    observations: PathBuf,
    #[arg(long, value_enum, default_value = "table")]
    format: EvaluateFormat,
}

impl EvaluateCommand {
    /// Per-KPI failures are reported but do not fail the command
    pub fn execute(self) -> Result<ExitCode> {
        let (catalog, observations) = load_inputs(&self.definitions, &self.observations)?;

        let mut timer = OperationTimer::new("evaluate");
        let report = enrich_all(&observations, &catalog);
        timer.set_items_count(report.facts.len() + report.errors.len());
        timer.add_field("facts", report.facts.len());
        timer.add_field("errors", report.errors.len());
        timer.finish();

        match self.format {
            EvaluateFormat::Table => {
                render::print_facts_table(&report.facts);
                render::print_enrichment_errors(&report.errors);
            }
            EvaluateFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
