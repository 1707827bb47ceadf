use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::air_bone_gap::{SIGNIFICANT_ABG_DB, abg};
use super::average::pta4;
use crate::pure_tone::ThresholdMap;

/// Upper bound of the normal band, dB HL.
const NORMAL_MAX_DB: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum LossType {
    Normal,
    Conductive,
    Sensorineural,
    Mixed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Severity {
    Normal,
    Slight,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
    Profound,
    Unknown,
}

impl Severity {
    /// Band a PTA-4 value.
    pub fn from_pta(pta: i32) -> Severity {
        match pta {
            p if p <= NORMAL_MAX_DB => Severity::Normal,
            p if p <= 25 => Severity::Slight,
            p if p <= 40 => Severity::Mild,
            p if p <= 55 => Severity::Moderate,
            p if p <= 70 => Severity::ModeratelySevere,
            p if p <= 90 => Severity::Severe,
            _ => Severity::Profound,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Slight => "slight",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::ModeratelySevere => "moderately severe",
            Severity::Severe => "severe",
            Severity::Profound => "profound",
            Severity::Unknown => "unclassified",
        }
    }
}

impl LossType {
    pub fn label(self) -> &'static str {
        match self {
            LossType::Normal => "normal hearing",
            LossType::Conductive => "conductive hearing loss",
            LossType::Sensorineural => "sensorineural hearing loss",
            LossType::Mixed => "mixed hearing loss",
            LossType::Unknown => "unclassified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Classification {
    pub loss_type: LossType,
    pub severity: Severity,
    pub type_label: String,
    pub severity_label: String,
    pub description: String,
}

impl Classification {
    fn new(loss_type: LossType, severity: Severity, description: &str) -> Self {
        Self {
            loss_type,
            severity,
            type_label: loss_type.label().to_string(),
            severity_label: severity.label().to_string(),
            description: description.to_string(),
        }
    }
}

/// Classify one ear from its air and bone thresholds.
///
/// Severity comes from the AC PTA-4 alone; type from the air-bone gap and the
/// bone-conduction PTA-4.
pub fn classify(ac: &ThresholdMap, bc: &ThresholdMap) -> Classification {
    let Some(pta) = pta4(ac) else {
        return Classification::new(
            LossType::Unknown,
            Severity::Unknown,
            "insufficient air-conduction data",
        );
    };

    let severity = Severity::from_pta(pta);
    if pta <= NORMAL_MAX_DB {
        return Classification::new(LossType::Normal, severity, "hearing within normal limits");
    }

    let gap = abg(ac, bc);
    let Some(avg_gap) = gap.average else {
        return Classification::new(
            LossType::Unknown,
            severity,
            "bone-conduction thresholds needed to determine type",
        );
    };

    if avg_gap < SIGNIFICANT_ABG_DB {
        return Classification::new(
            LossType::Sensorineural,
            severity,
            "cochlear or retrocochlear involvement",
        );
    }

    match pta4(bc) {
        Some(bc_pta) if bc_pta <= NORMAL_MAX_DB => Classification::new(
            LossType::Conductive,
            severity,
            "outer or middle ear transmission loss",
        ),
        _ => Classification::new(
            LossType::Mixed,
            severity,
            "conductive and sensorineural components",
        ),
    }
}
