use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Real-ear measurement outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Rem {
    pub performed: Option<bool>,
    /// Prescriptive formula, e.g. NAL-NL2.
    pub formula: Option<String>,
    pub target_match: Option<String>,
    pub mpo_safe: Option<bool>,
    pub summary: Option<String>,
}

/// Electroacoustic (test box) check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Eaa {
    pub performed: Option<bool>,
    pub pass: Option<bool>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Verification {
    pub rem: Rem,
    pub eaa: Eaa,
}

/// Usage figures read from the device's data log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Datalogging {
    pub hours_per_day: Option<f64>,
    pub environment_notes: Option<String>,
    pub note: Option<String>,
}
