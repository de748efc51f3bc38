//! KpiObservation - one measured value per evaluation request

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiObservation {
    #[serde(alias = "name", alias = "kpi_name")]
    pub kpi: String,
    pub current: f64,
    /// Absent when the data source has no prior period
    #[serde(default)]
    pub prior: Option<f64>,
}

impl KpiObservation {
    pub fn new(kpi: &str, current: f64, prior: f64) -> Self {
        Self {
            kpi: kpi.to_string(),
            current,
            prior: Some(prior),
        }
    }

    pub fn without_prior(kpi: &str, current: f64) -> Self {
        Self {
            kpi: kpi.to_string(),
            current,
            prior: None,
        }
    }
}
