//! Detailed tri-state checklists opened from individual protocol items.
//!
//! Field keys are the camelCase names stored in session records. Each sheet
//! is addressed generically by key so the UI and the CLI can edit any field
//! without a per-sheet code path.

use std::fmt;

use audiocare_core::models::ear::{Ear, EarPair};
use audiocare_core::models::tri_state::{self, TriState};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ProtocolError;

/// Generic access to a sheet of tri-state fields.
pub trait TriStateFields {
    /// Field keys in display order.
    fn field_keys(&self) -> &'static [&'static str];

    /// `None` when `key` is not a field of this sheet.
    fn field(&self, key: &str) -> Option<TriState>;

    /// Returns `false` and changes nothing when `key` is unknown.
    fn set_field(&mut self, key: &str, value: TriState) -> bool;

    /// Number of fields that have been answered either way.
    fn answered(&self) -> usize {
        self.field_keys()
            .iter()
            .filter(|key| self.field(key).flatten().is_some())
            .count()
    }
}

macro_rules! tri_state_sheet {
    ($(#[$meta:meta])* $name:ident { $($field:ident => $key:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
        #[serde(default)]
        #[ts(export)]
        pub struct $name {
            $(
                #[serde(rename = $key)]
                pub $field: TriState,
            )*
        }

        impl $name {
            pub const FIELDS: &'static [&'static str] = &[$($key),*];
        }

        impl TriStateFields for $name {
            fn field_keys(&self) -> &'static [&'static str] {
                Self::FIELDS
            }

            fn field(&self, key: &str) -> Option<TriState> {
                match key {
                    $($key => Some(self.$field),)*
                    _ => None,
                }
            }

            fn set_field(&mut self, key: &str, value: TriState) -> bool {
                match key {
                    $($key => {
                        self.$field = value;
                        true
                    })*
                    _ => false,
                }
            }
        }
    };
}

tri_state_sheet! {
    /// Ear canal and tympanic membrane findings, per ear.
    OtoscopyChecklist {
        earwax => "earwax",
        inflammation => "inflammation",
        stenosis => "stenosis",
        discharge => "discharge",
        perforation => "perforation",
        discoloration => "discoloration",
        effusion => "effusion",
        light_reflex => "lightReflex",
    }
}

tri_state_sheet! {
    /// Tympanogram review, per ear.
    TympanometryChecklist {
        type_complete => "typeComplete",
        peak_pressure_normal => "peakPressureNormal",
        compliance_normal => "complianceNormal",
        ecv_normal => "ecvNormal",
        effusion_suspected => "effusionSuspected",
        tube_dysfunction => "tubeDysfunction",
        perforation_suspected => "perforationSuspected",
        ossicular_abnormality => "ossicularAbnormality",
    }
}

tri_state_sheet! {
    DevicePlanChecklist {
        hearing_loss_output => "hearingLossOutput",
        ear_canal_check => "earCanalCheck",
        dexterity_vision => "dexterityVision",
        cosmetic_preference => "cosmeticPreference",
        bluetooth_need => "bluetoothNeed",
        tinnitus_feature => "tinnitusFeature",
        battery_preference => "batteryPreference",
        bilateral_check => "bilateralCheck",
        binaural_benefit => "binauralBenefit",
        unilateral_consider => "unilateralConsider",
        side_decision => "sideDecision",
        budget_range => "budgetRange",
        subsidy_check => "subsidyCheck",
        payment_method => "paymentMethod",
    }
}

tri_state_sheet! {
    /// Realistic expectations and adaptation counseling.
    ExpectationChecklist {
        assist_not_restore => "assistNotRestore",
        quiet_vs_noise_explain => "quietVsNoiseExplain",
        individual_difference => "individualDifference",
        adaptation_period_info => "adaptationPeriodInfo",
        brain_relearning => "brainRelearning",
        initial_discomfort => "initialDiscomfort",
        gradual_wear_increase => "gradualWearIncrease",
        own_voice_different => "ownVoiceDifferent",
        ambient_noise_louder => "ambientNoiseLouder",
        occlusion_possible => "occlusionPossible",
        natural_over_time => "naturalOverTime",
    }
}

tri_state_sheet! {
    ListeningCheckChecklist {
        external_damage => "externalDamage",
        battery_door_charging => "batteryDoorCharging",
        mic_port_clear => "micPortClear",
        receiver_tube_connection => "receiverTubeConnection",
        power_on_off => "powerOnOff",
        sound_quality => "soundQuality",
        volume_program_button => "volumeProgramButton",
        feedback_check => "feedbackCheck",
    }
}

tri_state_sheet! {
    /// Electroacoustic analysis in the test box.
    EaaChecklist {
        ospl90_measured => "ospl90Measured",
        full_on_gain_measured => "fullOnGainMeasured",
        ref_test_gain_measured => "refTestGainMeasured",
        spec_within_3db => "specWithin3dB",
        left_right_matching => "leftRightMatching",
        output_reduction => "outputReduction",
        frequency_response_issue => "frequencyResponseIssue",
    }
}

tri_state_sheet! {
    FitComfortChecklist {
        dome_mold_fit => "domeMoldFit",
        pain_discomfort => "painDiscomfort",
        secure_retention => "secureRetention",
        occlusion_check => "occlusionCheck",
        feedback_occurrence => "feedbackOccurrence",
        feedback_chewing => "feedbackChewing",
        feedback_hand_near => "feedbackHandNear",
    }
}

tri_state_sheet! {
    ProgrammingChecklist {
        prescription_applied => "prescriptionApplied",
        initial_gain_set => "initialGainSet",
        compression_ratio_set => "compressionRatioSet",
        frequency_gain_adjusted => "frequencyGainAdjusted",
        loudness_preference => "loudnessPreference",
        sound_quality_preference => "soundQualityPreference",
        program_setup => "programSetup",
    }
}

tri_state_sheet! {
    /// Real-ear measurement: insertion gain and speech mapping.
    RemChecklist {
        ig_probe_position => "igProbePosition",
        ig_reug_measured => "igReugMeasured",
        ig_target_match_250_to_4k => "igTargetMatch250to4k",
        ig_target_match_high_freq => "igTargetMatchHighFreq",
        ig_left_right_balance => "igLeftRightBalance",
        sm_probe_position => "smProbePosition",
        sm_speech_signal_set => "smSpeechSignalSet",
        sm_soft_50db => "smSoft50dB",
        sm_average_65db => "smAverage65dB",
        sm_loud_80db => "smLoud80dB",
        sm_speech_banana_cover => "smSpeechBananaCover",
        sm_consonant_audibility => "smConsonantAudibility",
    }
}

tri_state_sheet! {
    /// Maximum power output safety.
    MpoChecklist {
        ucl_reflected => "uclReflected",
        mpo_below_ucl => "mpoBelowUcl",
        no_discomfort_loud => "noDiscomfortLoud",
        mpo_90db_limit => "mpo90dBLimit",
        impact_sound_test => "impactSoundTest",
    }
}

tri_state_sheet! {
    OrientationCoreChecklist {
        wearing_method => "wearingMethod",
        removal_method => "removalMethod",
        left_right_identify => "leftRightIdentify",
        dome_mold_direction => "domeMoldDirection",
        charger_usage => "chargerUsage",
        charging_cycle => "chargingCycle",
        battery_level_check => "batteryLevelCheck",
        daily_cleaning => "dailyCleaning",
        moisture_storage => "moistureStorage",
        wax_filter_change => "waxFilterChange",
    }
}

tri_state_sheet! {
    AdaptationScheduleChecklist {
        week1_duration => "week1Duration",
        week2_duration => "week2Duration",
        week3_goal => "week3Goal",
        quiet_environment_first => "quietEnvironmentFirst",
        gradual_noise_exposure => "gradualNoiseExposure",
        tv_phone_adaptation => "tvPhoneAdaptation",
        initial_discomfort_normal => "initialDiscomfortNormal",
        adaptation_period => "adaptationPeriod",
        contact_on_issue => "contactOnIssue",
    }
}

tri_state_sheet! {
    /// Communication strategies for noisy settings.
    CommStrategiesChecklist {
        face_speaker => "faceSpeaker",
        choose_quiet_place => "chooseQuietPlace",
        maintain_distance => "maintainDistance",
        reduce_background_noise => "reduceBackgroundNoise",
        use_lighting => "useLighting",
        seat_positioning => "seatPositioning",
        ask_for_repeat => "askForRepeat",
        topic_awareness => "topicAwareness",
        family_cooperation => "familyCooperation",
    }
}

tri_state_sheet! {
    DeepCleaningChecklist {
        body_cleaning => "bodyCleaning",
        earmold_dome_cleaning => "earmoldDomCleaning",
        wax_guard_replacement => "waxGuardReplacement",
        tube_wire_check => "tubeWireCheck",
        battery_replacement => "batteryReplacement",
        charger_terminal_cleaning => "chargerTerminalCleaning",
        receiver_replacement => "receiverReplacement",
        mic_cover_replacement => "micCoverReplacement",
        moisture_removal => "moistureRemoval",
        desiccant_replacement => "desiccantReplacement",
        vent_cleaning => "ventCleaning",
    }
}

tri_state_sheet! {
    /// Care and replacement-interval reminders.
    EducationRefreshChecklist {
        daily_wiping => "dailyWiping",
        sleep_storage => "sleepStorage",
        dryer_usage => "dryerUsage",
        earwax_check => "earwaxCheck",
        wax_guard_cycle => "waxGuardCycle",
        dome_tip_cycle => "domeTipCycle",
        tube_cycle => "tubeCycle",
        desiccant_cycle => "desiccantCycle",
        moisture_warning => "moistureWarning",
        heat_warning => "heatWarning",
        cosmetics_warning => "cosmeticsWarning",
        storage_habit => "storageHabit",
    }
}

tri_state_sheet! {
    DataloggingAdjustmentChecklist {
        daily_wear_time => "dailyWearTime",
        environment_distribution => "environmentDistribution",
        program_usage_ratio => "programUsageRatio",
        volume_pattern => "volumePattern",
        quiet_optimization => "quietOptimization",
        noise_adjustment => "noiseAdjustment",
        music_media_adjustment => "musicMediaAdjustment",
        phone_call_adjustment => "phoneCallAdjustment",
    }
}

tri_state_sheet! {
    FineTuningChecklist {
        overall_gain => "overallGain",
        low_freq_gain => "lowFreqGain",
        high_freq_gain => "highFreqGain",
        compression_adjust => "compressionAdjust",
        default_program => "defaultProgram",
        noise_program => "noiseProgram",
        music_program => "musicProgram",
        streaming_program => "streamingProgram",
        feedback_management => "feedbackManagement",
        noise_reduction => "noiseReduction",
        directional_mic => "directionalMic",
        occlusion_management => "occlusionManagement",
    }
}

/// Which detailed sheet a checklist item opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SubChecklistKind {
    Otoscopy,
    Tympanometry,
    DevicePlan,
    Expectation,
    ListeningCheck,
    Eaa,
    FitComfort,
    Programming,
    Rem,
    Mpo,
    OrientationCore,
    AdaptationSchedule,
    CommStrategies,
    DeepCleaning,
    EducationRefresh,
    DataloggingAdjustment,
    FineTuning,
}

impl SubChecklistKind {
    pub const ALL: [SubChecklistKind; 17] = [
        SubChecklistKind::Otoscopy,
        SubChecklistKind::Tympanometry,
        SubChecklistKind::DevicePlan,
        SubChecklistKind::Expectation,
        SubChecklistKind::ListeningCheck,
        SubChecklistKind::Eaa,
        SubChecklistKind::FitComfort,
        SubChecklistKind::Programming,
        SubChecklistKind::Rem,
        SubChecklistKind::Mpo,
        SubChecklistKind::OrientationCore,
        SubChecklistKind::AdaptationSchedule,
        SubChecklistKind::CommStrategies,
        SubChecklistKind::DeepCleaning,
        SubChecklistKind::EducationRefresh,
        SubChecklistKind::DataloggingAdjustment,
        SubChecklistKind::FineTuning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SubChecklistKind::Otoscopy => "otoscopy",
            SubChecklistKind::Tympanometry => "tympanometry",
            SubChecklistKind::DevicePlan => "device_plan",
            SubChecklistKind::Expectation => "expectation",
            SubChecklistKind::ListeningCheck => "listening_check",
            SubChecklistKind::Eaa => "eaa",
            SubChecklistKind::FitComfort => "fit_comfort",
            SubChecklistKind::Programming => "programming",
            SubChecklistKind::Rem => "rem",
            SubChecklistKind::Mpo => "mpo",
            SubChecklistKind::OrientationCore => "orientation_core",
            SubChecklistKind::AdaptationSchedule => "adaptation_schedule",
            SubChecklistKind::CommStrategies => "comm_strategies",
            SubChecklistKind::DeepCleaning => "deep_cleaning",
            SubChecklistKind::EducationRefresh => "education_refresh",
            SubChecklistKind::DataloggingAdjustment => "datalogging_adjustment",
            SubChecklistKind::FineTuning => "fine_tuning",
        }
    }

    pub fn parse(s: &str) -> Option<SubChecklistKind> {
        SubChecklistKind::ALL.into_iter().find(|k| k.as_str() == s.trim())
    }

    /// Otoscopy and tympanometry are recorded separately for each ear.
    pub fn is_per_ear(self) -> bool {
        matches!(self, SubChecklistKind::Otoscopy | SubChecklistKind::Tympanometry)
    }

    pub fn fields(self) -> &'static [&'static str] {
        match self {
            SubChecklistKind::Otoscopy => OtoscopyChecklist::FIELDS,
            SubChecklistKind::Tympanometry => TympanometryChecklist::FIELDS,
            SubChecklistKind::DevicePlan => DevicePlanChecklist::FIELDS,
            SubChecklistKind::Expectation => ExpectationChecklist::FIELDS,
            SubChecklistKind::ListeningCheck => ListeningCheckChecklist::FIELDS,
            SubChecklistKind::Eaa => EaaChecklist::FIELDS,
            SubChecklistKind::FitComfort => FitComfortChecklist::FIELDS,
            SubChecklistKind::Programming => ProgrammingChecklist::FIELDS,
            SubChecklistKind::Rem => RemChecklist::FIELDS,
            SubChecklistKind::Mpo => MpoChecklist::FIELDS,
            SubChecklistKind::OrientationCore => OrientationCoreChecklist::FIELDS,
            SubChecklistKind::AdaptationSchedule => AdaptationScheduleChecklist::FIELDS,
            SubChecklistKind::CommStrategies => CommStrategiesChecklist::FIELDS,
            SubChecklistKind::DeepCleaning => DeepCleaningChecklist::FIELDS,
            SubChecklistKind::EducationRefresh => EducationRefreshChecklist::FIELDS,
            SubChecklistKind::DataloggingAdjustment => DataloggingAdjustmentChecklist::FIELDS,
            SubChecklistKind::FineTuning => FineTuningChecklist::FIELDS,
        }
    }
}

impl fmt::Display for SubChecklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every detailed sheet for one session. Missing sheets default to all
/// fields unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct SubChecklists {
    pub otoscopy: EarPair<OtoscopyChecklist>,
    pub tympanometry: EarPair<TympanometryChecklist>,
    pub device_plan: DevicePlanChecklist,
    pub expectation: ExpectationChecklist,
    pub listening_check: ListeningCheckChecklist,
    pub eaa: EaaChecklist,
    pub fit_comfort: FitComfortChecklist,
    pub programming: ProgrammingChecklist,
    pub rem: RemChecklist,
    pub mpo: MpoChecklist,
    pub orientation_core: OrientationCoreChecklist,
    pub adaptation_schedule: AdaptationScheduleChecklist,
    pub comm_strategies: CommStrategiesChecklist,
    pub deep_cleaning: DeepCleaningChecklist,
    pub education_refresh: EducationRefreshChecklist,
    pub datalogging_adjustment: DataloggingAdjustmentChecklist,
    pub fine_tuning: FineTuningChecklist,
}

impl SubChecklists {
    /// The sheet for `kind`. Per-ear sheets need an ear; flat sheets ignore it.
    pub fn sheet(
        &self,
        kind: SubChecklistKind,
        ear: Option<Ear>,
    ) -> Result<&dyn TriStateFields, ProtocolError> {
        let sheet: &dyn TriStateFields = match kind {
            SubChecklistKind::Otoscopy => self.otoscopy.get(require_ear(kind, ear)?),
            SubChecklistKind::Tympanometry => self.tympanometry.get(require_ear(kind, ear)?),
            SubChecklistKind::DevicePlan => &self.device_plan,
            SubChecklistKind::Expectation => &self.expectation,
            SubChecklistKind::ListeningCheck => &self.listening_check,
            SubChecklistKind::Eaa => &self.eaa,
            SubChecklistKind::FitComfort => &self.fit_comfort,
            SubChecklistKind::Programming => &self.programming,
            SubChecklistKind::Rem => &self.rem,
            SubChecklistKind::Mpo => &self.mpo,
            SubChecklistKind::OrientationCore => &self.orientation_core,
            SubChecklistKind::AdaptationSchedule => &self.adaptation_schedule,
            SubChecklistKind::CommStrategies => &self.comm_strategies,
            SubChecklistKind::DeepCleaning => &self.deep_cleaning,
            SubChecklistKind::EducationRefresh => &self.education_refresh,
            SubChecklistKind::DataloggingAdjustment => &self.datalogging_adjustment,
            SubChecklistKind::FineTuning => &self.fine_tuning,
        };
        Ok(sheet)
    }

    fn sheet_mut(
        &mut self,
        kind: SubChecklistKind,
        ear: Option<Ear>,
    ) -> Result<&mut dyn TriStateFields, ProtocolError> {
        let sheet: &mut dyn TriStateFields = match kind {
            SubChecklistKind::Otoscopy => self.otoscopy.get_mut(require_ear(kind, ear)?),
            SubChecklistKind::Tympanometry => self.tympanometry.get_mut(require_ear(kind, ear)?),
            SubChecklistKind::DevicePlan => &mut self.device_plan,
            SubChecklistKind::Expectation => &mut self.expectation,
            SubChecklistKind::ListeningCheck => &mut self.listening_check,
            SubChecklistKind::Eaa => &mut self.eaa,
            SubChecklistKind::FitComfort => &mut self.fit_comfort,
            SubChecklistKind::Programming => &mut self.programming,
            SubChecklistKind::Rem => &mut self.rem,
            SubChecklistKind::Mpo => &mut self.mpo,
            SubChecklistKind::OrientationCore => &mut self.orientation_core,
            SubChecklistKind::AdaptationSchedule => &mut self.adaptation_schedule,
            SubChecklistKind::CommStrategies => &mut self.comm_strategies,
            SubChecklistKind::DeepCleaning => &mut self.deep_cleaning,
            SubChecklistKind::EducationRefresh => &mut self.education_refresh,
            SubChecklistKind::DataloggingAdjustment => &mut self.datalogging_adjustment,
            SubChecklistKind::FineTuning => &mut self.fine_tuning,
        };
        Ok(sheet)
    }

    pub fn get(
        &self,
        kind: SubChecklistKind,
        ear: Option<Ear>,
        field: &str,
    ) -> Result<TriState, ProtocolError> {
        self.sheet(kind, ear)?
            .field(field)
            .ok_or_else(|| unknown_field(kind, field))
    }

    pub fn set(
        &mut self,
        kind: SubChecklistKind,
        ear: Option<Ear>,
        field: &str,
        value: TriState,
    ) -> Result<(), ProtocolError> {
        if self.sheet_mut(kind, ear)?.set_field(field, value) {
            Ok(())
        } else {
            Err(unknown_field(kind, field))
        }
    }

    /// Advance one field `null → true → false → null` and return its new value.
    pub fn cycle(
        &mut self,
        kind: SubChecklistKind,
        ear: Option<Ear>,
        field: &str,
    ) -> Result<TriState, ProtocolError> {
        let next = tri_state::cycle(self.get(kind, ear, field)?);
        self.set(kind, ear, field, next)?;
        Ok(next)
    }
}

fn require_ear(kind: SubChecklistKind, ear: Option<Ear>) -> Result<Ear, ProtocolError> {
    ear.ok_or(ProtocolError::EarRequired { kind })
}

fn unknown_field(kind: SubChecklistKind, field: &str) -> ProtocolError {
    ProtocolError::UnknownField {
        kind,
        field: field.to_string(),
    }
}
