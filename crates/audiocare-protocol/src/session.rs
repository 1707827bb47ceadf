//! The per-visit session record and the edits that can be made to it.
//!
//! A session is changed only through [`HaSession::apply`], which returns a new
//! value and never touches its receiver. Concurrent editors are not
//! reconciled: the last saved copy wins.

use std::collections::BTreeMap;

use audiocare_audiometry::middle_ear::MiddleEar;
use audiocare_audiometry::pure_tone::{PureTone, Transducer};
use audiocare_audiometry::sound_field::SoundField;
use audiocare_audiometry::speech::{Speech, SpeechCondition, SpeechMetric, WrsField};
use audiocare_audiometry::verification::{Datalogging, Verification};
use audiocare_core::ids::{CustomerId, VisitId};
use audiocare_core::models::ear::Ear;
use audiocare_core::models::frequency::{Frequency, Modality};
use audiocare_core::models::tri_state::TriState;
use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::checklist::{ChecklistEntry, ChecklistItem, ItemNote, ItemStatus};
use crate::error::ProtocolError;
use crate::stage::Stage;
use crate::sub_checklists::{SubChecklistKind, SubChecklists};
use crate::{StageTemplate, template};

/// Every result sheet recorded during a visit. Absent sheets were not
/// started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ClinicalResults {
    pub pure_tone: Option<PureTone>,
    pub middle_ear: Option<MiddleEar>,
    pub speech: Option<Speech>,
    pub sound_field: Option<SoundField>,
    pub verification: Option<Verification>,
    pub datalogging: Option<Datalogging>,
    pub sub_checklists: SubChecklists,
}

/// Free-text summaries of fitting changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Adjustments {
    pub programming_summary: Option<String>,
    pub gain_change_summary: Option<String>,
    pub noise_program_change: Option<String>,
    pub feedback_management: Option<String>,
    pub occlusion_management: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EducationTopic {
    InsertionRemoval,
    BatteryCharging,
    CleaningCare,
    AppBluetooth,
    AdaptationScheduleGiven,
    CommunicationStrategies,
}

impl EducationTopic {
    pub const ALL: [EducationTopic; 6] = [
        EducationTopic::InsertionRemoval,
        EducationTopic::BatteryCharging,
        EducationTopic::CleaningCare,
        EducationTopic::AppBluetooth,
        EducationTopic::AdaptationScheduleGiven,
        EducationTopic::CommunicationStrategies,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EducationTopic::InsertionRemoval => "insertion_removal",
            EducationTopic::BatteryCharging => "battery_charging",
            EducationTopic::CleaningCare => "cleaning_care",
            EducationTopic::AppBluetooth => "app_bluetooth",
            EducationTopic::AdaptationScheduleGiven => "adaptation_schedule_given",
            EducationTopic::CommunicationStrategies => "communication_strategies",
        }
    }
}

/// Counseling topics covered this visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Education {
    pub insertion_removal: TriState,
    pub battery_charging: TriState,
    pub cleaning_care: TriState,
    pub app_bluetooth: TriState,
    pub adaptation_schedule_given: TriState,
    pub communication_strategies: TriState,
}

impl Education {
    pub fn get(&self, topic: EducationTopic) -> TriState {
        match topic {
            EducationTopic::InsertionRemoval => self.insertion_removal,
            EducationTopic::BatteryCharging => self.battery_charging,
            EducationTopic::CleaningCare => self.cleaning_care,
            EducationTopic::AppBluetooth => self.app_bluetooth,
            EducationTopic::AdaptationScheduleGiven => self.adaptation_schedule_given,
            EducationTopic::CommunicationStrategies => self.communication_strategies,
        }
    }

    pub fn set(&mut self, topic: EducationTopic, value: TriState) {
        let slot = match topic {
            EducationTopic::InsertionRemoval => &mut self.insertion_removal,
            EducationTopic::BatteryCharging => &mut self.battery_charging,
            EducationTopic::CleaningCare => &mut self.cleaning_care,
            EducationTopic::AppBluetooth => &mut self.app_bluetooth,
            EducationTopic::AdaptationScheduleGiven => &mut self.adaptation_schedule_given,
            EducationTopic::CommunicationStrategies => &mut self.communication_strategies,
        };
        *slot = value;
    }
}

/// Re-rating of the three COSI goals set at the first visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct CosiReview {
    pub goal1: Option<String>,
    pub goal2: Option<String>,
    pub goal3: Option<String>,
    pub improvement_1: Option<i32>,
    pub improvement_2: Option<i32>,
    pub improvement_3: Option<i32>,
}

impl CosiReview {
    /// Goal text and improvement rating for goal `number` (1-based).
    pub fn goal(&self, number: u8) -> Option<(Option<&str>, Option<i32>)> {
        match number {
            1 => Some((self.goal1.as_deref(), self.improvement_1)),
            2 => Some((self.goal2.as_deref(), self.improvement_2)),
            3 => Some((self.goal3.as_deref(), self.improvement_3)),
            _ => None,
        }
    }

    fn set_goal(
        &mut self,
        number: u8,
        goal: Option<String>,
        improvement: Option<i32>,
    ) -> Result<(), ProtocolError> {
        let (goal_slot, improvement_slot) = match number {
            1 => (&mut self.goal1, &mut self.improvement_1),
            2 => (&mut self.goal2, &mut self.improvement_2),
            3 => (&mut self.goal3, &mut self.improvement_3),
            other => return Err(ProtocolError::GoalIndex(other)),
        };
        *goal_slot = goal;
        *improvement_slot = improvement;
        Ok(())
    }
}

pub const MAX_SATISFACTION: u8 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Validation {
    pub cosi_top3_review: Option<CosiReview>,
    /// 0 to 10.
    pub satisfaction_0to10: Option<u8>,
}

/// Results from an earlier visit used to pre-fill a new session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorResults {
    pub pure_tone: Option<PureTone>,
    pub speech: Option<Speech>,
}

impl PriorResults {
    pub fn is_empty(&self) -> bool {
        !self.pure_tone.as_ref().is_some_and(PureTone::has_data)
            && !self.speech.as_ref().is_some_and(Speech::has_data)
    }
}

/// One edit to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "op", rename_all = "snake_case")]
#[ts(export)]
pub enum SessionMutation {
    SetVisitDate {
        date: Option<Date>,
    },
    SetThreshold {
        ear: Ear,
        modality: Modality,
        frequency: Frequency,
        value: Option<i32>,
    },
    ToggleNoResponse {
        ear: Ear,
        modality: Modality,
        frequency: Frequency,
    },
    /// Replaces the audiogram header fields.
    SetPureToneDetails {
        test_date: Option<Date>,
        transducer: Option<Transducer>,
        masking_used: Option<bool>,
        notes: Option<String>,
    },
    SetSpeechValue {
        condition: SpeechCondition,
        metric: SpeechMetric,
        value: Option<i32>,
    },
    SetWordRecognition {
        condition: SpeechCondition,
        field: WrsField,
    },
    SetSpeechNotes {
        notes: Option<String>,
    },
    SetItemStatus {
        key: String,
        status: ItemStatus,
    },
    SetItemNote {
        key: String,
        note: ItemNote,
    },
    SetSubChecklistField {
        kind: SubChecklistKind,
        ear: Option<Ear>,
        field: String,
        value: TriState,
    },
    CycleSubChecklistField {
        kind: SubChecklistKind,
        ear: Option<Ear>,
        field: String,
    },
    SetMiddleEar {
        middle_ear: MiddleEar,
    },
    SetSoundField {
        sound_field: SoundField,
    },
    SetVerification {
        verification: Verification,
    },
    SetDatalogging {
        datalogging: Datalogging,
    },
    SetAdjustments {
        adjustments: Adjustments,
    },
    SetEducation {
        topic: EducationTopic,
        value: TriState,
    },
    SetCosiGoal {
        number: u8,
        goal: Option<String>,
        improvement: Option<i32>,
    },
    /// Values above 10 are clamped.
    SetSatisfaction {
        score: Option<u8>,
    },
}

fn epoch() -> Timestamp {
    Timestamp::UNIX_EPOCH
}

/// One hearing-aid protocol visit: checklist progress plus every result
/// recorded during it. Keyed by `(customer_id, visit_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HaSession {
    pub customer_id: CustomerId,
    pub visit_id: VisitId,
    #[serde(default)]
    pub visit_date: Option<Date>,
    #[serde(rename = "ha_stage")]
    pub stage: Stage,
    #[serde(default)]
    pub checklist: BTreeMap<String, ChecklistEntry>,
    #[serde(default, alias = "results_detailed")]
    pub results: ClinicalResults,
    #[serde(default)]
    pub adjustments: Adjustments,
    #[serde(default)]
    pub education: Education,
    #[serde(default)]
    pub validation: Validation,
    #[serde(default = "epoch")]
    pub created_at: Timestamp,
    #[serde(default = "epoch")]
    pub updated_at: Timestamp,
}

impl HaSession {
    /// Start a session with the stage's default checklist. Pure-tone and
    /// speech results are carried over from `prior` as not performed.
    pub fn create(
        customer_id: CustomerId,
        visit_id: VisitId,
        stage: Stage,
        visit_date: Option<Date>,
        prior: Option<&PriorResults>,
        now: Timestamp,
    ) -> HaSession {
        let mut session = HaSession {
            customer_id,
            visit_id,
            visit_date,
            stage,
            checklist: template(stage).default_checklist(),
            results: ClinicalResults::default(),
            adjustments: Adjustments::default(),
            education: Education::default(),
            validation: Validation::default(),
            created_at: now,
            updated_at: now,
        };
        if let Some(prior) = prior {
            session.seed_from(prior);
        }
        tracing::debug!(
            customer = %session.customer_id,
            visit = %session.visit_id,
            stage = %stage,
            seeded = prior.is_some_and(|p| !p.is_empty()),
            "session created"
        );
        session
    }

    /// Fill pure-tone and speech from `prior` where this session has none of
    /// its own yet. Running it twice changes nothing more.
    pub fn reseed(&self, prior: &PriorResults) -> HaSession {
        let mut next = self.clone();
        next.seed_from(prior);
        next
    }

    fn seed_from(&mut self, prior: &PriorResults) {
        let has_pure_tone = self.results.pure_tone.as_ref().is_some_and(PureTone::has_data);
        if !has_pure_tone
            && let Some(pure_tone) = prior.pure_tone.as_ref().filter(|p| p.has_data())
        {
            self.results.pure_tone = Some(pure_tone.carried_over());
        }

        let has_speech = self.results.speech.as_ref().is_some_and(Speech::has_data);
        if !has_speech && let Some(speech) = prior.speech.as_ref().filter(|s| s.has_data()) {
            self.results.speech = Some(speech.carried_over());
        }
    }

    pub fn template(&self) -> &'static dyn StageTemplate {
        template(self.stage)
    }

    /// Current status of `key`; untouched items report their default.
    pub fn item_status(&self, key: &str) -> Option<ItemStatus> {
        let template = self.template();
        template
            .item(key)
            .map(|item| template.status_of(item, &self.checklist))
    }

    pub fn missing_required(&self) -> Vec<&'static ChecklistItem> {
        self.template().missing_required(&self.checklist)
    }

    pub fn first_incomplete(&self) -> Option<&'static ChecklistItem> {
        self.template().first_incomplete(&self.checklist)
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Suggested date for the following appointment.
    pub fn recommended_next_visit(&self) -> Option<Date> {
        self.visit_date
            .map(|date| self.stage.recommended_next_visit(date))
    }

    /// Returns `false` and changes nothing for keys not on this stage.
    pub fn set_item_status(&mut self, key: &str, status: ItemStatus) -> bool {
        self.try_set_item_status(key, status).is_ok()
    }

    pub fn set_item_note(&mut self, key: &str, note: ItemNote) -> bool {
        self.try_set_item_note(key, note).is_ok()
    }

    pub fn set_sub_checklist_field(
        &mut self,
        kind: SubChecklistKind,
        ear: Option<Ear>,
        field: &str,
        value: TriState,
    ) -> bool {
        self.results
            .sub_checklists
            .set(kind, ear, field, value)
            .is_ok()
    }

    /// Advance one sub-checklist field; `None` when the field does not exist.
    pub fn cycle_sub_checklist_field(
        &mut self,
        kind: SubChecklistKind,
        ear: Option<Ear>,
        field: &str,
    ) -> Option<TriState> {
        self.results.sub_checklists.cycle(kind, ear, field).ok()
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut ChecklistEntry, ProtocolError> {
        let item = self
            .template()
            .item(key)
            .ok_or_else(|| ProtocolError::UnknownItem {
                stage: self.stage,
                key: key.to_string(),
            })?;
        Ok(self
            .checklist
            .entry(item.key.clone())
            .or_insert_with(|| ChecklistEntry::new(item.default_status)))
    }

    fn try_set_item_status(&mut self, key: &str, status: ItemStatus) -> Result<(), ProtocolError> {
        self.entry_mut(key)?.status = status;
        Ok(())
    }

    fn try_set_item_note(&mut self, key: &str, note: ItemNote) -> Result<(), ProtocolError> {
        if let Some(tag) = note.tag
            && let Some(item) = self.template().item(key)
            && !item.offers(tag)
        {
            return Err(ProtocolError::TagNotOffered {
                key: key.to_string(),
                tag,
            });
        }
        self.entry_mut(key)?.note = note;
        Ok(())
    }

    /// Apply one edit and return the updated session, or the reason it was
    /// refused. `self` is never modified.
    pub fn try_apply(
        &self,
        mutation: SessionMutation,
        now: Timestamp,
    ) -> Result<HaSession, ProtocolError> {
        let mut next = self.clone();
        next.apply_in_place(mutation)?;
        next.updated_at = now;
        Ok(next)
    }

    /// Like [`try_apply`](Self::try_apply), but a refused edit is logged and
    /// yields an unchanged copy with only `updated_at` refreshed.
    pub fn apply(&self, mutation: SessionMutation, now: Timestamp) -> HaSession {
        match self.try_apply(mutation, now) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(
                    customer = %self.customer_id,
                    visit = %self.visit_id,
                    stage = %self.stage,
                    error = %e,
                    "session edit ignored"
                );
                self.finalize(now)
            }
        }
    }

    /// Stamp the session as saved at `now`.
    pub fn finalize(&self, now: Timestamp) -> HaSession {
        HaSession {
            updated_at: now,
            ..self.clone()
        }
    }

    /// Recompute derived values, for records loaded from storage.
    pub fn rederive(&mut self) {
        if let Some(pure_tone) = self.results.pure_tone.as_mut() {
            pure_tone.rederive();
        }
    }

    fn pure_tone_mut(&mut self) -> &mut PureTone {
        self.results.pure_tone.get_or_insert_with(PureTone::default)
    }

    fn speech_mut(&mut self) -> &mut Speech {
        self.results.speech.get_or_insert_with(Speech::default)
    }

    fn apply_in_place(&mut self, mutation: SessionMutation) -> Result<(), ProtocolError> {
        match mutation {
            SessionMutation::SetVisitDate { date } => self.visit_date = date,
            SessionMutation::SetThreshold {
                ear,
                modality,
                frequency,
                value,
            } => self
                .pure_tone_mut()
                .set_threshold(ear, modality, frequency, value)?,
            SessionMutation::ToggleNoResponse {
                ear,
                modality,
                frequency,
            } => self.pure_tone_mut().toggle_nr(ear, modality, frequency)?,
            SessionMutation::SetPureToneDetails {
                test_date,
                transducer,
                masking_used,
                notes,
            } => {
                let pure_tone = self.pure_tone_mut();
                pure_tone.test_date = test_date;
                pure_tone.transducer = transducer;
                pure_tone.masking_used = masking_used;
                pure_tone.notes = notes;
            }
            SessionMutation::SetSpeechValue {
                condition,
                metric,
                value,
            } => self.speech_mut().set_value(condition, metric, value),
            SessionMutation::SetWordRecognition { condition, field } => {
                self.speech_mut().set_wrs(condition, field)
            }
            SessionMutation::SetSpeechNotes { notes } => self.speech_mut().notes = notes,
            SessionMutation::SetItemStatus { key, status } => {
                self.try_set_item_status(&key, status)?
            }
            SessionMutation::SetItemNote { key, note } => self.try_set_item_note(&key, note)?,
            SessionMutation::SetSubChecklistField {
                kind,
                ear,
                field,
                value,
            } => self.results.sub_checklists.set(kind, ear, &field, value)?,
            SessionMutation::CycleSubChecklistField { kind, ear, field } => {
                self.results.sub_checklists.cycle(kind, ear, &field)?;
            }
            SessionMutation::SetMiddleEar { middle_ear } => {
                self.results.middle_ear = Some(middle_ear)
            }
            SessionMutation::SetSoundField { sound_field } => {
                self.results.sound_field = Some(sound_field)
            }
            SessionMutation::SetVerification { verification } => {
                self.results.verification = Some(verification)
            }
            SessionMutation::SetDatalogging { datalogging } => {
                self.results.datalogging = Some(datalogging)
            }
            SessionMutation::SetAdjustments { adjustments } => self.adjustments = adjustments,
            SessionMutation::SetEducation { topic, value } => self.education.set(topic, value),
            SessionMutation::SetCosiGoal {
                number,
                goal,
                improvement,
            } => self
                .validation
                .cosi_top3_review
                .get_or_insert_with(CosiReview::default)
                .set_goal(number, goal, improvement)?,
            SessionMutation::SetSatisfaction { score } => {
                self.validation.satisfaction_0to10 = score.map(|s| s.min(MAX_SATISFACTION))
            }
        }
        Ok(())
    }
}
