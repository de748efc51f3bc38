use super::load_catalog;
use crate::render;
use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Args)]
pub struct CheckConfigCommand {
    /// KPI definitions file (YAML or JSON)
    definitions: PathBuf,
}

impl CheckConfigCommand {
    pub fn execute(self) -> Result<ExitCode> {
        let catalog = load_catalog(&self.definitions)?;
        info!(kpis = catalog.len(), "Loaded KPI definitions");

        render::print_catalog(&catalog);

        let areas = catalog.subject_areas();
        if !areas.is_empty() {
            println!(
                "Subject areas: {}",
                areas.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        let issues = catalog.validation_issues();
        if issues.is_empty() {
            println!("{} {} KPI definitions are valid", "✓".green(), catalog.len());
            return Ok(ExitCode::SUCCESS);
        }

        eprintln!("{}", format!("{} invalid definition(s):", issues.len()).red().bold());
        for (kpi, reason) in &issues {
            eprintln!("  {} {}: {}", "✗".red(), kpi, reason);
        }
        Ok(ExitCode::FAILURE)
    }
}
