//! Clinical derivation rules.
//!
//! Every function here is a pure function of its arguments and is total:
//! missing data produces `None`/`false` plus a reason string, never a panic.
//! Callers pass thresholds with no-response slots already removed (see
//! [`PureTone::effective`](crate::pure_tone::PureTone::effective)).

pub mod agreement;
pub mod air_bone_gap;
pub mod average;
pub mod classification;
pub mod eligibility;
pub mod masking;

pub use agreement::{AgreementStatus, SrtAgreement, srt_pta_agreement};
pub use air_bone_gap::{AirBoneGap, SIGNIFICANT_ABG_DB, abg};
pub use average::{PTA4, PTA6, ThresholdAverage, pta4, pta6, round_half_up};
pub use classification::{Classification, LossType, Severity, classify};
pub use eligibility::{Eligibility, check_disability_eligibility, check_disability_eligibility_with_wrs};
pub use masking::{MaskingNeed, check_masking_need};
