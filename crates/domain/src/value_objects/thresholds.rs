//! Thresholds - optional lower/upper band boundaries of a KPI

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "threshold_low", default)]
    pub low: Option<f64>,
    #[serde(rename = "threshold_high", default)]
    pub high: Option<f64>,
}

impl Thresholds {
    pub fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self { low, high }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Both boundaries, if both are configured
    pub fn pair(&self) -> Option<(f64, f64)> {
        match (self.low, self.high) {
            (Some(low), Some(high)) => Some((low, high)),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pair().is_some()
    }

    /// Configured boundaries must be finite and ordered `low <= high`
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [("threshold_low", self.low), ("threshold_high", self.high)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("{label} must be finite, got {v}"));
                }
            }
        }

        if let Some((low, high)) = self.pair() {
            if low > high {
                return Err(format!(
                    "threshold_low ({low}) is greater than threshold_high ({high})"
                ));
            }
        }

        Ok(())
    }
}
