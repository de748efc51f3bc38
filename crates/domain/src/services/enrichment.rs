//! Fact enrichment - observation + definition -> KpiFact
//!
//! Deterministic and free of I/O. Errors are isolated per observation:
//! `enrich_all` never stops at the first bad entry.

use crate::catalog::KpiCatalog;
use crate::entities::{KpiDefinition, KpiFact, KpiObservation};
use crate::errors::{EnrichmentError, EnrichmentResult};
use crate::value_objects::PercentChange;
use serde::Serialize;
use tracing::{debug, warn};

/// Enrich one observation using the catalog lookup
pub fn enrich(observation: &KpiObservation, catalog: &KpiCatalog) -> EnrichmentResult<KpiFact> {
    let definition = catalog
        .get(&observation.kpi)
        .ok_or_else(|| EnrichmentError::UnknownKpi {
            name: observation.kpi.clone(),
        })?;
    enrich_with_definition(observation, definition)
}

/// Enrich one observation against an explicit definition.
///
/// The definition must belong to the observed KPI, otherwise the KPI is
/// reported as unknown.
pub fn enrich_with_definition(
    observation: &KpiObservation,
    definition: &KpiDefinition,
) -> EnrichmentResult<KpiFact> {
    let name = observation.kpi.trim();
    if name != definition.name.trim() {
        return Err(EnrichmentError::UnknownKpi {
            name: observation.kpi.clone(),
        });
    }

    let current = observation.current;
    if !current.is_finite() {
        return Err(EnrichmentError::invalid(
            name,
            format!("current value must be finite, got {current}"),
        ));
    }

    let prior = observation
        .prior
        .ok_or_else(|| EnrichmentError::invalid(name, "prior value is missing"))?;
    if !prior.is_finite() {
        return Err(EnrichmentError::invalid(
            name,
            format!("prior value must be finite, got {prior}"),
        ));
    }

    definition
        .validate()
        .map_err(|reason| EnrichmentError::invalid(name, reason))?;

    let status = definition.direction.classify(current, &definition.thresholds);

    Ok(KpiFact {
        kpi: definition.name.clone(),
        unit: definition.unit.clone(),
        direction: definition.direction,
        current,
        prior,
        percent_change: PercentChange::between(current, prior),
        threshold_low: definition.thresholds.low,
        threshold_high: definition.thresholds.high,
        peer_avg: definition.peer_avg,
        peer_delta: definition.peer_avg.map(|avg| current - avg),
        industry_avg: definition.industry_avg,
        industry_delta: definition.industry_avg.map(|avg| current - avg),
        status,
        subject_area: definition.subject_area.clone(),
    })
}

/// Outcome of enriching a batch: every observation ends up in exactly one
/// of the two lists
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentReport {
    pub facts: Vec<KpiFact>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<EnrichmentError>,
}

impl EnrichmentReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total(&self) -> usize {
        self.facts.len() + self.errors.len()
    }
}

/// Enrich every observation, collecting per-item failures
pub fn enrich_all<'a, I>(observations: I, catalog: &KpiCatalog) -> EnrichmentReport
where
    I: IntoIterator<Item = &'a KpiObservation>,
{
    let mut report = EnrichmentReport::default();

    for observation in observations {
        match enrich(observation, catalog) {
            Ok(fact) => {
                debug!(kpi = %fact.kpi, status = %fact.status, "Enriched KPI");
                report.facts.push(fact);
            }
            Err(error) => {
                warn!(kpi = %error.kpi_name(), error = %error, "Skipping KPI observation");
                report.errors.push(error);
            }
        }
    }

    report
}

#[derive(Serialize)]
struct ErrorEntry<'a> {
    kpi: &'a str,
    code: &'static str,
    message: String,
}

fn serialize_errors<S>(errors: &[EnrichmentError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    let mut seq = serializer.serialize_seq(Some(errors.len()))?;
    for error in errors {
        seq.serialize_element(&ErrorEntry {
            kpi: error.kpi_name(),
            code: error.code(),
            message: error.to_string(),
        })?;
    }
    seq.end()
}
