use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Better-ear PTA-6 at or above which both ears qualify.
pub const BETTER_EAR_CUTOFF_DB: i32 = 60;
/// Worse-ear PTA-6 at or above which one profound ear qualifies on its own.
pub const WORSE_EAR_CUTOFF_DB: i32 = 80;
/// Word recognition at or below which both ears qualify on speech.
pub const WRS_CUTOFF_PERCENT: i32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Eligibility {
    pub eligible: bool,
    pub reason: String,
}

impl Eligibility {
    fn yes(reason: String) -> Self {
        Self {
            eligible: true,
            reason,
        }
    }

    fn no(reason: String) -> Self {
        Self {
            eligible: false,
            reason,
        }
    }
}

/// Hearing-disability registration check from both ears' PTA-6.
pub fn check_disability_eligibility(pta6_right: Option<i32>, pta6_left: Option<i32>) -> Eligibility {
    check_disability_eligibility_with_wrs(pta6_right, pta6_left, None, None)
}

/// As [`check_disability_eligibility`], also applying the word-recognition
/// rule when both scores are known.
///
/// Rules, in order:
/// 1. better ear >= 60 dB
/// 2. worse ear >= 80 dB, whatever the other ear
/// 3. both ears WRS <= 50 %
pub fn check_disability_eligibility_with_wrs(
    pta6_right: Option<i32>,
    pta6_left: Option<i32>,
    wrs_right: Option<i32>,
    wrs_left: Option<i32>,
) -> Eligibility {
    let (right, left) = match (pta6_right, pta6_left) {
        (Some(r), Some(l)) => (r, l),
        (None, None) => return Eligibility::no("insufficient data: no PTA-6 for either ear".into()),
        (None, Some(_)) => return Eligibility::no("insufficient data: no PTA-6 for the right ear".into()),
        (Some(_), None) => return Eligibility::no("insufficient data: no PTA-6 for the left ear".into()),
    };

    let better = right.min(left);
    let worse = right.max(left);

    if better >= BETTER_EAR_CUTOFF_DB {
        return Eligibility::yes(format!("both ears >= {BETTER_EAR_CUTOFF_DB} dB (better ear {better} dB)"));
    }

    if worse >= WORSE_EAR_CUTOFF_DB {
        return Eligibility::yes(format!("one ear {worse} dB, other ear {better} dB"));
    }

    if let (Some(wr), Some(wl)) = (wrs_right, wrs_left)
        && wr <= WRS_CUTOFF_PERCENT
        && wl <= WRS_CUTOFF_PERCENT
    {
        return Eligibility::yes(format!(
            "word recognition <= {WRS_CUTOFF_PERCENT}% in both ears ({wr}% / {wl}%)"
        ));
    }

    let wrs_note = match (wrs_right, wrs_left) {
        (Some(wr), Some(wl)) => format!(", WRS {wr}/{wl}%"),
        _ => String::new(),
    };
    Eligibility::no(format!("criteria not met (PTA-6 {better}/{worse} dB{wrs_note})"))
}
