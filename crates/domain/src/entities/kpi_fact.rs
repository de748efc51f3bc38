//! KpiFact - an observation enriched with comparisons and a status

use crate::value_objects::{Direction, PercentChange, Status};
use serde::Serialize;

/// Derived facts for one KPI, as fed to the prompt builder.
///
/// `status` depends only on `current`, the thresholds and the direction.
/// The benchmark deltas are informational.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiFact {
    pub kpi: String,
    pub unit: String,
    pub direction: Direction,
    pub current: f64,
    pub prior: f64,
    pub percent_change: PercentChange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_delta: Option<f64>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_area: Option<String>,
}
