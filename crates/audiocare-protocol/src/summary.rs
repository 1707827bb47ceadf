use audiocare_audiometry::clinical::{
    AirBoneGap, Classification, Eligibility, MaskingNeed, SrtAgreement, abg,
    check_disability_eligibility_with_wrs, check_masking_need, classify, srt_pta_agreement,
};
use audiocare_audiometry::pure_tone::PureTone;
use audiocare_audiometry::speech::{Speech, SpeechCondition, SpeechMetric};
use audiocare_core::models::ear::{Ear, EarPair};
use audiocare_core::models::frequency::Modality;
use jiff::civil::Date;
use serde::Serialize;
use ts_rs::TS;

use crate::session::HaSession;
use crate::stage::Stage;

/// Derived figures for one ear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct EarSummary {
    pub pta4: Option<i32>,
    pub pta6: Option<i32>,
    pub sf_pta4: Option<i32>,
    pub air_bone_gap: AirBoneGap,
    pub classification: Classification,
    pub srt_agreement: SrtAgreement,
}

/// Read-only view of a session for display and export. Nothing here is
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SessionSummary {
    pub stage: Stage,
    pub ears: EarPair<EarSummary>,
    pub masking: MaskingNeed,
    pub eligibility: Eligibility,
    /// Keys of required items not yet done, in template order.
    pub missing_required: Vec<String>,
    pub next_stage: Stage,
    pub next_visit: Option<Date>,
}

impl HaSession {
    pub fn summary(&self) -> SessionSummary {
        let pure_tone = self.results.pure_tone.clone().unwrap_or_default();
        let speech = self.results.speech.clone().unwrap_or_default();

        let ears = EarPair::new(
            ear_summary(&pure_tone, &speech, Ear::Right),
            ear_summary(&pure_tone, &speech, Ear::Left),
        );

        let masking = check_masking_need(
            &pure_tone.effective(Ear::Right, Modality::Ac),
            &pure_tone.effective(Ear::Left, Modality::Ac),
            &pure_tone.effective(Ear::Right, Modality::Bc),
            &pure_tone.effective(Ear::Left, Modality::Bc),
        );

        let derived = pure_tone.derived();
        let eligibility = check_disability_eligibility_with_wrs(
            derived.ac_pta6(Ear::Right),
            derived.ac_pta6(Ear::Left),
            speech.wrs_score(SpeechCondition::Right),
            speech.wrs_score(SpeechCondition::Left),
        );

        SessionSummary {
            stage: self.stage,
            ears,
            masking,
            eligibility,
            missing_required: self
                .missing_required()
                .into_iter()
                .map(|item| item.key.clone())
                .collect(),
            next_stage: self.stage.next(),
            next_visit: self.recommended_next_visit(),
        }
    }
}

fn ear_summary(pure_tone: &PureTone, speech: &Speech, ear: Ear) -> EarSummary {
    let ac = pure_tone.effective(ear, Modality::Ac);
    let bc = pure_tone.effective(ear, Modality::Bc);
    let derived = pure_tone.derived();
    let srt = speech.value(SpeechCondition::from(ear), SpeechMetric::Srt);

    EarSummary {
        pta4: derived.ac_pta4(ear),
        pta6: derived.ac_pta6(ear),
        sf_pta4: derived.sf_pta4(ear),
        air_bone_gap: abg(&ac, &bc),
        classification: classify(&ac, &bc),
        srt_agreement: srt_pta_agreement(srt, derived.ac_pta4(ear)),
    }
}
