use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum AgreementStatus {
    Good,
    Acceptable,
    Poor,
    Unknown,
}

/// Cross-check of the speech recognition threshold against the pure-tone
/// average for the same ear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SrtAgreement {
    pub is_valid: bool,
    pub difference: Option<i32>,
    pub status: AgreementStatus,
    pub message: String,
}

/// SRT and PTA should agree within 10 dB; 6 dB or less is good agreement.
pub fn srt_pta_agreement(srt: Option<i32>, pta: Option<i32>) -> SrtAgreement {
    let (Some(srt), Some(pta)) = (srt, pta) else {
        return SrtAgreement {
            is_valid: false,
            difference: None,
            status: AgreementStatus::Unknown,
            message: "insufficient data".to_string(),
        };
    };

    let diff = srt.saturating_sub(pta).saturating_abs();
    let (is_valid, status, message) = match diff {
        d if d <= 6 => (true, AgreementStatus::Good, format!("good agreement ({d} dB)")),
        d if d <= 10 => (true, AgreementStatus::Acceptable, format!("acceptable agreement ({d} dB)")),
        d => (false, AgreementStatus::Poor, format!("poor agreement ({d} dB), retest advised")),
    };

    SrtAgreement {
        is_valid,
        difference: Some(diff),
        status,
        message,
    }
}
