use std::collections::BTreeSet;

use audiocare_core::models::frequency::{Frequency, Modality};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::air_bone_gap::SIGNIFICANT_ABG_DB;
use crate::pure_tone::ThresholdMap;

/// Interaural attenuation for air conduction through supra-aural phones.
pub const INTERAURAL_ATTENUATION_AC_DB: i32 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaskingNeed {
    pub need_masking: bool,
    /// Implicated frequencies, ascending.
    pub frequencies: Vec<Frequency>,
    pub reason: String,
}

/// Flag frequencies where the non-test ear may have heard the signal.
///
/// Air conduction crosses over when the two ears differ by at least the
/// interaural attenuation. Bone conduction has no useful interaural
/// attenuation, so any ear with an air-bone gap of 10 dB or more at a
/// frequency needs its bone threshold masked there.
pub fn check_masking_need(
    ac_right: &ThresholdMap,
    ac_left: &ThresholdMap,
    bc_right: &ThresholdMap,
    bc_left: &ThresholdMap,
) -> MaskingNeed {
    if ac_right.is_empty() && ac_left.is_empty() {
        return MaskingNeed {
            need_masking: false,
            frequencies: Vec::new(),
            reason: "insufficient air-conduction data".to_string(),
        };
    }

    let air: Vec<Frequency> = Frequency::ALL
        .into_iter()
        .filter(|f| match (ac_right.get(*f), ac_left.get(*f)) {
            (Some(r), Some(l)) => r.abs_diff(l) >= INTERAURAL_ATTENUATION_AC_DB.unsigned_abs(),
            _ => false,
        })
        .collect();

    let gap_at = |ac: &ThresholdMap, bc: &ThresholdMap, f: Frequency| match (ac.get(f), bc.get(f)) {
        (Some(a), Some(b)) => a.saturating_sub(b) >= SIGNIFICANT_ABG_DB,
        _ => false,
    };
    let bone: Vec<Frequency> = Modality::Bc
        .supported_frequencies()
        .iter()
        .copied()
        .filter(|f| gap_at(ac_right, bc_right, *f) || gap_at(ac_left, bc_left, *f))
        .collect();

    let frequencies: Vec<Frequency> = air
        .iter()
        .chain(bone.iter())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if frequencies.is_empty() {
        return MaskingNeed {
            need_masking: false,
            frequencies,
            reason: "masking not required".to_string(),
        };
    }

    let mut causes = Vec::new();
    if !air.is_empty() {
        causes.push(format!(
            "interaural AC difference >= {INTERAURAL_ATTENUATION_AC_DB} dB at {} Hz",
            join(&air)
        ));
    }
    if !bone.is_empty() {
        causes.push(format!(
            "air-bone gap >= {SIGNIFICANT_ABG_DB} dB at {} Hz",
            join(&bone)
        ));
    }

    MaskingNeed {
        need_masking: true,
        reason: format!("masking required at {} Hz ({})", join(&frequencies), causes.join("; ")),
        frequencies,
    }
}

fn join(frequencies: &[Frequency]) -> String {
    frequencies
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
