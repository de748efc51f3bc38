use super::load_inputs;
use crate::progress::WaitSpinner;
use crate::render;
use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use colored::*;
use common::{OperationTimer, RequestContext};
use domain::{enrich_all, EnrichmentReport, KpiObservation};
use llm::{InsightGenerator, InsightReport, ProviderError, ProviderSettings, RetryableError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};

/// Exit status when the provider step fails
const PROVIDER_FAILURE: u8 = 2;
const ALL_KPIS: &str = "All KPIs";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InsightsFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct InsightsCommand {
    /// KPI definitions file (YAML or JSON)
    definitions: PathBuf,
    /// Observations file: a list of {kpi, current, prior}
    observations: PathBuf,
    /// Restrict the request to one subject area (dashboard tab)
    #[arg(long)]
    tab: Option<String>,
    /// Per-attempt timeout in seconds (overrides LLM_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,
    /// Retries after a transient provider failure (overrides LLM_MAX_RETRIES)
    #[arg(long)]
    retries: Option<u32>,
    #[arg(long, value_enum, default_value = "text")]
    format: InsightsFormat,
}

#[derive(Serialize)]
struct InsightsOutput<'a> {
    subject_area: &'a str,
    #[serde(flatten)]
    enrichment: &'a EnrichmentReport,
    insights: &'a InsightReport,
}

impl InsightsCommand {
    pub async fn execute(self) -> Result<ExitCode> {
        let (catalog, observations) = load_inputs(&self.definitions, &self.observations)?;

        let subject_area = match &self.tab {
            Some(tab) => {
                let areas = catalog.subject_areas();
                if !areas.iter().any(|area| area.eq_ignore_ascii_case(tab)) {
                    bail!(
                        "unknown subject area '{}' (available: {})",
                        tab,
                        areas.into_iter().collect::<Vec<_>>().join(", ")
                    );
                }
                tab.clone()
            }
            None => ALL_KPIS.to_string(),
        };

        // Unknown names stay in scope so they are reported as UnknownKpi
        let in_scope: Vec<&KpiObservation> = match &self.tab {
            Some(tab) => {
                let tab_kpis: BTreeSet<&str> = catalog
                    .in_subject_area(tab)
                    .map(|definition| definition.name.trim())
                    .collect();
                observations
                    .iter()
                    .filter(|obs| !catalog.contains(&obs.kpi) || tab_kpis.contains(obs.kpi.trim()))
                    .collect()
            }
            None => observations.iter().collect(),
        };
        debug!(
            total = observations.len(),
            in_scope = in_scope.len(),
            "Selected observations for '{}'",
            subject_area
        );

        let report = enrich_all(in_scope, &catalog);
        render::print_enrichment_errors(&report.errors);
        if report.facts.is_empty() {
            bail!("no KPI facts could be enriched for '{subject_area}'");
        }

        let mut settings = match ProviderSettings::from_env() {
            Ok(settings) => settings,
            Err(e) => return Ok(provider_failure(&e)),
        };
        if let Some(secs) = self.timeout {
            if secs == 0 {
                bail!("--timeout must be greater than zero");
            }
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        if let Some(retries) = self.retries {
            settings = settings.with_max_retries(retries);
        }

        let generator = match InsightGenerator::from_settings(&settings) {
            Ok(generator) => generator,
            Err(e) => return Ok(provider_failure(&e)),
        };

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let context = RequestContext::new().with_subject_area(subject_area.clone());
        info!(
            provider = %generator.provider_name(),
            facts = report.facts.len(),
            "Requesting insights"
        );

        let spinner = WaitSpinner::start(&format!(
            "Generating insights for {} via {}",
            subject_area,
            generator.provider_name()
        ));
        let mut timer = OperationTimer::new("generate_insights");
        timer.add_field("subject_area", &subject_area);
        timer.set_items_count(report.facts.len());
        let result = generator
            .generate_with_cancellation(&subject_area, &report.facts, &cancel)
            .instrument(context.span())
            .await;
        timer.finish_with_result(&result);

        let insights = match result {
            Ok(insights) => {
                spinner.finish_success("Insights ready");
                insights
            }
            Err(e) => {
                spinner.finish_error("Insight generation failed");
                return Ok(provider_failure(&e));
            }
        };

        match self.format {
            InsightsFormat::Text => render::print_insight_report(&subject_area, &insights),
            InsightsFormat::Json => {
                let output = InsightsOutput {
                    subject_area: &subject_area,
                    enrichment: &report,
                    insights: &insights,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn provider_failure(error: &ProviderError) -> ExitCode {
    render::print_error_chain(error);

    let hint = match error {
        ProviderError::Configuration(_) => {
            "check LLM_PROVIDER, the API key variables and LLM_BASE_URL, then retry"
        }
        ProviderError::Cancelled => "the request was cancelled; run the command again to retry",
        e if e.is_retryable() => {
            "this looks transient; retry, or pass --retries N / a longer --timeout"
        }
        _ => "no insights were produced; run the command again to retry",
    };
    eprintln!("{} {}", "Hint:".yellow().bold(), hint);

    ExitCode::from(PROVIDER_FAILURE)
}
