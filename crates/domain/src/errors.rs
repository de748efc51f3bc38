//! Domain Errors - per-observation enrichment failures and catalog loading failures

use std::path::PathBuf;
use thiserror::Error;

/// Failure to enrich a single observation.
///
/// These never abort a batch: `enrich_all` collects them next to the
/// successfully enriched facts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    /// The observation references a KPI with no definition
    #[error("Unknown KPI: {name}")]
    UnknownKpi { name: String },

    /// Non-finite or missing input value, or inconsistent definition
    #[error("Invalid value for KPI {kpi}: {reason}")]
    InvalidValue { kpi: String, reason: String },
}

impl EnrichmentError {
    pub fn invalid(kpi: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            kpi: kpi.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the KPI the error belongs to
    pub fn kpi_name(&self) -> &str {
        match self {
            EnrichmentError::UnknownKpi { name } => name,
            EnrichmentError::InvalidValue { kpi, .. } => kpi,
        }
    }

    /// Stable short code, used in machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            EnrichmentError::UnknownKpi { .. } => "unknown_kpi",
            EnrichmentError::InvalidValue { .. } => "invalid_value",
        }
    }
}

pub type EnrichmentResult<T> = Result<T, EnrichmentError>;

/// Failure to load KPI definitions or observations from disk
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {source}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported file format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Duplicate KPI definition: {0}")]
    DuplicateKpi(String),

    #[error("KPI definition has an empty name")]
    EmptyName,
}

pub type CatalogResult<T> = Result<T, CatalogError>;
