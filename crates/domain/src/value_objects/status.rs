//! Status - classification of a KPI's current value against its thresholds

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(alias = "good", alias = "GOOD")]
    Good,
    #[serde(alias = "watch", alias = "WATCH")]
    Watch,
    #[serde(alias = "critical", alias = "CRITICAL")]
    Critical,
    #[serde(alias = "unknown", alias = "UNKNOWN")]
    Unknown,
}

impl Status {
    /// Ordering of the judged bands, worst first. `Unknown` has no rank.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Status::Critical => Some(0),
            Status::Watch => Some(1),
            Status::Good => Some(2),
            Status::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Good => "Good",
            Status::Watch => "Watch",
            Status::Critical => "Critical",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
