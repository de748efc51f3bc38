//! PercentChange - relative change from the prior period

use serde::{Serialize, Serializer};
use std::fmt;

/// Relative change from prior, in percent.
///
/// A zero prior has no meaningful relative change and is reported as
/// `NotApplicable`, serialized as the string `"n/a"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentChange {
    Value(f64),
    NotApplicable,
}

impl PercentChange {
    pub fn between(current: f64, prior: f64) -> Self {
        if prior == 0.0 {
            return PercentChange::NotApplicable;
        }

        let change = (current - prior) / prior * 100.0;
        if change.is_finite() {
            PercentChange::Value(change)
        } else {
            PercentChange::NotApplicable
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PercentChange::Value(v) => Some(*v),
            PercentChange::NotApplicable => None,
        }
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::Value(v) => write!(f, "{v:+.2}%"),
            PercentChange::NotApplicable => f.write_str("n/a"),
        }
    }
}

impl Serialize for PercentChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PercentChange::Value(v) => serializer.serialize_f64(*v),
            PercentChange::NotApplicable => serializer.serialize_str("n/a"),
        }
    }
}
