use std::collections::BTreeMap;

use audiocare_core::models::frequency::{Frequency, Modality};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::average::ratio_half_up;
use crate::pure_tone::ThresholdMap;

/// Average gap at or above which a conductive component is flagged.
pub const SIGNIFICANT_ABG_DB: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AirBoneGap {
    /// AC minus BC at every frequency where both were measured. Raw values:
    /// negative gaps are kept and also listed in `negative_frequencies`.
    pub by_frequency: BTreeMap<Frequency, i32>,
    pub average: Option<i32>,
    pub significant: bool,
    pub negative_frequencies: Vec<Frequency>,
    pub message: String,
}

/// Air-bone gap for one ear.
pub fn abg(ac: &ThresholdMap, bc: &ThresholdMap) -> AirBoneGap {
    let by_frequency: BTreeMap<Frequency, i32> = Modality::Bc
        .supported_frequencies()
        .iter()
        .filter_map(|f| match (ac.get(*f), bc.get(*f)) {
            (Some(a), Some(b)) => Some((*f, a.saturating_sub(b))),
            _ => None,
        })
        .collect();

    let negative_frequencies = by_frequency
        .iter()
        .filter(|(_, gap)| **gap < 0)
        .map(|(f, _)| *f)
        .collect();

    let sum: i64 = by_frequency.values().map(|g| i64::from(*g)).sum();
    let average = ratio_half_up(sum, by_frequency.len() as i64);

    let message = match average {
        None => "no frequency with both air and bone thresholds".to_string(),
        Some(avg) if avg < SIGNIFICANT_ABG_DB => format!("within normal range ({avg} dB)"),
        Some(avg) if avg < 15 => format!("slight conductive component ({avg} dB)"),
        Some(avg) if avg < 25 => format!("moderate conductive component ({avg} dB)"),
        Some(avg) => format!("marked conductive component ({avg} dB)"),
    };

    AirBoneGap {
        by_frequency,
        average,
        significant: average.is_some_and(|avg| avg >= SIGNIFICANT_ABG_DB),
        negative_frequencies,
        message,
    }
}
