//! KpiDefinition - static configuration of one KPI

use crate::value_objects::{Direction, Thresholds};
use serde::{Deserialize, Serialize};

/// Static configuration of a KPI, loaded once and never mutated.
///
/// The name is the catalog key; in definition files it is the map key and
/// is filled in by the catalog loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    #[serde(default)]
    pub name: String,
    pub unit: String,
    pub direction: Direction,
    #[serde(flatten)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub peer_avg: Option<f64>,
    #[serde(default)]
    pub industry_avg: Option<f64>,
    /// Dashboard tab the KPI belongs to
    #[serde(default)]
    pub subject_area: Option<String>,
}

impl KpiDefinition {
    pub fn new(name: &str, unit: &str, direction: Direction) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            direction,
            thresholds: Thresholds::none(),
            peer_avg: None,
            industry_avg: None,
            subject_area: None,
        }
    }

    pub fn with_thresholds(mut self, low: f64, high: f64) -> Self {
        self.thresholds = Thresholds::new(Some(low), Some(high));
        self
    }

    pub fn with_peer_avg(mut self, peer_avg: f64) -> Self {
        self.peer_avg = Some(peer_avg);
        self
    }

    pub fn with_industry_avg(mut self, industry_avg: f64) -> Self {
        self.industry_avg = Some(industry_avg);
        self
    }

    pub fn with_subject_area(mut self, subject_area: &str) -> Self {
        self.subject_area = Some(subject_area.to_string());
        self
    }

    /// Consistency problems that make this definition unusable for enrichment
    pub fn validate(&self) -> Result<(), String> {
        self.thresholds.validate()?;

        for (label, value) in [("peer_avg", self.peer_avg), ("industry_avg", self.industry_avg)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("{label} must be finite, got {v}"));
                }
            }
        }

        if self.unit.trim().is_empty() {
            return Err("unit must not be empty".to_string());
        }

        Ok(())
    }

    pub fn belongs_to(&self, subject_area: &str) -> bool {
        self.subject_area
            .as_deref()
            .is_some_and(|area| area.eq_ignore_ascii_case(subject_area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_validate() {
        let def = KpiDefinition::new("Drop Call Rate", "%", Direction::LowerIsBetter)
            .with_thresholds(0.5, 1.0)
            .with_peer_avg(0.7)
            .with_subject_area("Retainability");
        assert!(def.validate().is_ok());
        assert!(def.belongs_to("retainability"));
        assert!(!def.belongs_to("Accessibility"));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds_and_blank_unit() {
        let inverted = KpiDefinition::new("X", "%", Direction::HigherIsBetter).with_thresholds(2.0, 1.0);
        assert!(inverted.validate().is_err());

        let blank = KpiDefinition::new("X", "  ", Direction::Neutral);
        assert_eq!(blank.validate().unwrap_err(), "unit must not be empty");
    }

    #[test]
    fn test_deserialize_flattened_thresholds() {
        let yaml = "unit: ms\ndirection: lower_is_better\nthreshold_low: 10\nthreshold_high: 40\n";
        let def: KpiDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.thresholds.pair(), Some((10.0, 40.0)));
        assert_eq!(def.direction, Direction::LowerIsBetter);
        assert!(def.peer_avg.is_none());
    }
}
