//! Terminal rendering for facts, enrichment errors and insight reports

use colored::*;
use domain::{EnrichmentError, KpiCatalog, KpiFact, Status};
use llm::InsightReport;
use prettytable::{row, Table};

pub fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Good => status.as_str().green().bold(),
        Status::Watch => status.as_str().yellow().bold(),
        Status::Critical => status.as_str().red().bold(),
        Status::Unknown => status.as_str().dimmed(),
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn signed(value: Option<f64>) -> String {
    value.map(|v| format!("{v:+.2}")).unwrap_or_else(|| "-".to_string())
}

pub fn print_facts_table(facts: &[KpiFact]) {
    let mut table = Table::new();
    table.add_row(row![
        "KPI", "Unit", "Current", "Prior", "Change", "Low", "High", "Peer Δ", "Industry Δ", "Status"
    ]);

    for fact in facts {
        table.add_row(row![
            fact.kpi,
            fact.unit,
            format!("{:.2}", fact.current),
            format!("{:.2}", fact.prior),
            fact.percent_change.to_string(),
            optional(fact.threshold_low),
            optional(fact.threshold_high),
            signed(fact.peer_delta),
            signed(fact.industry_delta),
            status_label(fact.status).to_string()
        ]);
    }

    table.printstd();
}

pub fn print_enrichment_errors(errors: &[EnrichmentError]) {
    if errors.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("{}", format!("{} observation(s) skipped:", errors.len()).yellow().bold());
    for error in errors {
        eprintln!("  {} [{}] {}", "•".yellow(), error.code(), error);
    }
}

pub fn print_catalog(catalog: &KpiCatalog) {
    let mut table = Table::new();
    table.add_row(row!["Subject area", "KPI", "Unit", "Direction", "Low", "High", "Peer", "Industry"]);

    for definition in catalog.iter() {
        table.add_row(row![
            definition.subject_area.as_deref().unwrap_or("-"),
            definition.name,
            definition.unit,
            definition.direction.to_string(),
            optional(definition.thresholds.low),
            optional(definition.thresholds.high),
            optional(definition.peer_avg),
            optional(definition.industry_avg)
        ]);
    }

    table.printstd();
}

pub fn print_insight_report(subject_area: &str, report: &InsightReport) {
    println!();
    println!("{}", format!("━━ {subject_area} ━━").cyan().bold());
    println!("{}", report.overall_summary);

    for detail in &report.kpi_details {
        println!();
        println!("{} {}", detail.kpi_name.bold(), status_label(detail.status));
        for bullet in &detail.bullets {
            println!("  • {bullet}");
        }
    }
}

/// Print an error followed by each of its causes
pub fn print_error_chain(error: &dyn std::error::Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
        source = cause.source();
    }
}
