//! Direction - which way a KPI is favourable, and the status rule per variant

use super::{Status, Thresholds};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
    /// No threshold judgment is made: the value is reported as `Good`
    Neutral,
}

impl Direction {
    /// Classify `current` against the configured bands.
    ///
    /// A value exactly on a threshold always lands in the better of the two
    /// adjacent bands. Missing thresholds give `Unknown` for every direction,
    /// including `Neutral`.
    pub fn classify(self, current: f64, thresholds: &Thresholds) -> Status {
        let Some((low, high)) = thresholds.pair() else {
            return Status::Unknown;
        };

        match self {
            Direction::HigherIsBetter => {
                if current < low {
                    Status::Critical
                } else if current < high {
                    Status::Watch
                } else {
                    Status::Good
                }
            }
            Direction::LowerIsBetter => {
                if current > high {
                    Status::Critical
                } else if current > low {
                    Status::Watch
                } else {
                    Status::Good
                }
            }
            Direction::Neutral => Status::Good,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HigherIsBetter => "higher_is_better",
            Direction::LowerIsBetter => "lower_is_better",
            Direction::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "higher_is_better" => Ok(Direction::HigherIsBetter),
            "lower_is_better" => Ok(Direction::LowerIsBetter),
            "neutral" => Ok(Direction::Neutral),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}
