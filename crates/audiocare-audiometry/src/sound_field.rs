use audiocare_core::models::ear::EarPair;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::pure_tone::ThresholdMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct AidedSpeech {
    pub test_name: Option<String>,
    pub score_right: Option<i32>,
    pub score_left: Option<i32>,
    pub note: Option<String>,
}

/// Aided sound-field results recorded at the fitting visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct SoundField {
    pub performed: bool,
    pub aided_thresholds: Option<EarPair<ThresholdMap>>,
    pub aided_speech: Option<AidedSpeech>,
}
