//! Flattening of one session into an ordered list of columns.
//!
//! Every section contributes the same columns whether or not it was filled
//! in, so rows of one stage line up. Checklist columns follow the stage
//! template, which is the only place rows of different stages differ.

use audiocare_audiometry::middle_ear::{MiddleEar, TympType};
use audiocare_audiometry::pure_tone::{PureTone, Reading, Transducer};
use audiocare_audiometry::sound_field::SoundField;
use audiocare_audiometry::speech::{Speech, SpeechCondition, SpeechMetric};
use audiocare_audiometry::verification::{Datalogging, Verification};
use audiocare_core::models::ear::Ear;
use audiocare_core::models::frequency::{Frequency, Modality};
use audiocare_core::models::tri_state;
use audiocare_protocol::checklist::ChecklistEntry;
use audiocare_protocol::session::{EducationTopic, HaSession};
use audiocare_protocol::sub_checklists::{SubChecklistKind, SubChecklists};
use audiocare_protocol::summary::SessionSummary;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Literal cell value for a no-response threshold.
pub const NO_RESPONSE: &str = "NR";

/// Column/value pairs in column order. Serializes as a JSON object that
/// keeps that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRow(Vec<(String, String)>);

impl ExportRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }

    fn opt<T: ToString>(&mut self, column: impl Into<String>, value: Option<T>) {
        self.push(column, value.map(|v| v.to_string()).unwrap_or_default());
    }

    fn flag(&mut self, column: impl Into<String>, value: Option<bool>) {
        self.push(column, yes_no(value));
    }
}

impl Serialize for ExportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, value) in &self.0 {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Project `session` into one export row. Pure read; derived values come from
/// [`HaSession::summary`].
pub fn flatten_session(session: &HaSession) -> ExportRow {
    let mut row = ExportRow::new();
    let summary = session.summary();

    row.push("customer_id", session.customer_id.as_str());
    row.push("visit_id", session.visit_id.as_str());
    row.opt("visit_date", session.visit_date);
    row.push("stage", session.stage.as_str());
    row.push("created_at", session.created_at.to_string());
    row.push("updated_at", session.updated_at.to_string());

    let pure_tone = session.results.pure_tone.clone().unwrap_or_default();
    push_pure_tone(&mut row, &pure_tone, session.results.pure_tone.is_some());
    push_derived(&mut row, &summary);

    let speech = session.results.speech.clone().unwrap_or_default();
    push_speech(&mut row, &speech);

    push_middle_ear(&mut row, session.results.middle_ear.as_ref());
    push_sound_field(&mut row, session.results.sound_field.as_ref());
    push_verification(&mut row, session.results.verification.as_ref());
    push_datalogging(&mut row, session.results.datalogging.as_ref());

    push_checklist(&mut row, session);
    push_sub_checklists(&mut row, &session.results.sub_checklists);

    let adjustments = &session.adjustments;
    row.opt("adj_programming_summary", adjustments.programming_summary.as_ref());
    row.opt("adj_gain_change_summary", adjustments.gain_change_summary.as_ref());
    row.opt("adj_noise_program_change", adjustments.noise_program_change.as_ref());
    row.opt("adj_feedback_management", adjustments.feedback_management.as_ref());
    row.opt("adj_occlusion_management", adjustments.occlusion_management.as_ref());

    for topic in EducationTopic::ALL {
        row.push(
            format!("edu_{}", topic.as_str()),
            tri_state::label(session.education.get(topic)),
        );
    }

    let review = session.validation.cosi_top3_review.clone().unwrap_or_default();
    for number in 1..=3u8 {
        let (goal, improvement) = review.goal(number).unwrap_or((None, None));
        row.opt(format!("cosi_goal{number}"), goal);
        row.opt(format!("cosi_improvement{number}"), improvement);
    }
    row.opt("satisfaction_0to10", session.validation.satisfaction_0to10);

    row.push("missing_required", summary.missing_required.join(", "));
    row.push("next_stage", summary.next_stage.as_str());
    row.opt("next_visit", summary.next_visit);

    tracing::debug!(
        customer = %session.customer_id,
        visit = %session.visit_id,
        columns = row.len(),
        "session flattened"
    );
    row
}

fn push_pure_tone(row: &mut ExportRow, pure_tone: &PureTone, recorded: bool) {
    row.push("pt_performed", if recorded { yes_no(Some(pure_tone.performed)) } else { "" });
    row.opt("pt_test_date", pure_tone.test_date);
    row.push("pt_transducer", pure_tone.transducer.map(transducer_label).unwrap_or(""));
    row.flag("pt_masking_used", pure_tone.masking_used);
    row.opt("pt_notes", pure_tone.notes.as_ref());

    for modality in Modality::ALL {
        for ear in Ear::BOTH {
            for frequency in Frequency::ALL {
                let cell = match pure_tone.reading(ear, modality, frequency) {
                    Reading::NotApplicable => continue,
                    Reading::NoResponse => NO_RESPONSE.to_string(),
                    Reading::Untested => String::new(),
                    Reading::Threshold(v) => v.to_string(),
                };
                row.push(
                    format!("pta_{}_{}_{}", ear.label(), modality.label(), frequency.label()),
                    cell,
                );
            }
        }
    }
}

fn push_derived(row: &mut ExportRow, summary: &SessionSummary) {
    for ear in Ear::BOTH {
        let side = ear.label();
        let ear_summary = summary.ears.get(ear);
        row.opt(format!("pta4_{side}"), ear_summary.pta4);
        row.opt(format!("pta6_{side}"), ear_summary.pta6);
        row.opt(format!("sf_pta4_{side}"), ear_summary.sf_pta4);
        row.opt(format!("abg_avg_{side}"), ear_summary.air_bone_gap.average);
        row.flag(
            format!("abg_significant_{side}"),
            Some(ear_summary.air_bone_gap.significant),
        );
        row.push(
            format!("loss_type_{side}"),
            ear_summary.classification.type_label.as_str(),
        );
        row.push(
            format!("severity_{side}"),
            ear_summary.classification.severity_label.as_str(),
        );
        row.opt(
            format!("srt_pta_difference_{side}"),
            ear_summary.srt_agreement.difference,
        );
    }

    row.flag("masking_needed", Some(summary.masking.need_masking));
    row.push(
        "masking_frequencies",
        summary
            .masking
            .frequencies
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(", "),
    );
    row.flag("disability_eligible", Some(summary.eligibility.eligible));
    row.push("disability_reason", summary.eligibility.reason.as_str());
}

fn push_speech(row: &mut ExportRow, speech: &Speech) {
    for metric in SpeechMetric::ALL {
        for condition in SpeechCondition::ALL {
            row.opt(
                format!("{}_{}", metric.label(), condition.label()),
                speech.value(condition, metric),
            );
        }
    }
    for condition in SpeechCondition::ALL {
        let wrs = speech.wrs(condition);
        let prefix = format!("wrs_{}", condition.label());
        row.opt(format!("{prefix}_score"), wrs.and_then(|w| w.score_percent));
        row.opt(format!("{prefix}_list"), wrs.and_then(|w| w.list_id.as_ref()));
        row.opt(format!("{prefix}_level"), wrs.and_then(|w| w.level_dbhl));
    }
    row.opt("speech_notes", speech.notes.as_ref());
}

fn push_middle_ear(row: &mut ExportRow, middle_ear: Option<&MiddleEar>) {
    let middle_ear = middle_ear.cloned().unwrap_or_default();
    row.opt("otoscopy_right", middle_ear.otoscopy.right.as_ref());
    row.opt("otoscopy_left", middle_ear.otoscopy.left.as_ref());
    row.opt("otoscopy_notes", middle_ear.otoscopy.notes.as_ref());
    for ear in Ear::BOTH {
        let tymp = middle_ear.tympanometry.ear(ear);
        let prefix = format!("tymp_{}", ear.label());
        row.push(
            format!("{prefix}_type"),
            tymp.tymp_type.map(tymp_label).unwrap_or(""),
        );
        row.opt(format!("{prefix}_peak_dapa"), tymp.peak_pressure_dapa);
        row.opt(format!("{prefix}_compliance_ml"), tymp.compliance_ml);
        row.opt(format!("{prefix}_ecv_ml"), tymp.ecv_ml);
    }
    row.opt("tymp_notes", middle_ear.tympanometry.notes.as_ref());
}

fn push_sound_field(row: &mut ExportRow, sound_field: Option<&SoundField>) {
    let sound_field = sound_field.cloned().unwrap_or_default();
    let aided = sound_field.aided_thresholds.unwrap_or_default();
    for ear in Ear::BOTH {
        let thresholds = aided.get(ear);
        for frequency in Frequency::ALL.into_iter().filter(|f| Modality::Sf.supports(*f)) {
            row.opt(
                format!("aided_{}_{}", ear.label(), frequency.label()),
                thresholds.get(frequency),
            );
        }
    }
    let speech = sound_field.aided_speech.unwrap_or_default();
    row.opt("aided_speech_test", speech.test_name);
    row.opt("aided_speech_right", speech.score_right);
    row.opt("aided_speech_left", speech.score_left);
    row.opt("aided_speech_note", speech.note);
}

fn push_verification(row: &mut ExportRow, verification: Option<&Verification>) {
    let verification = verification.cloned().unwrap_or_default();
    let rem = verification.rem;
    row.flag("rem_performed", rem.performed);
    row.opt("rem_formula", rem.formula);
    row.opt("rem_target_match", rem.target_match);
    row.flag("rem_mpo_safe", rem.mpo_safe);
    row.opt("rem_summary", rem.summary);
    let eaa = verification.eaa;
    row.flag("eaa_performed", eaa.performed);
    row.flag("eaa_pass", eaa.pass);
    row.opt("eaa_summary", eaa.summary);
}

fn push_datalogging(row: &mut ExportRow, datalogging: Option<&Datalogging>) {
    let datalogging = datalogging.cloned().unwrap_or_default();
    row.opt("datalog_hours_per_day", datalogging.hours_per_day);
    row.opt("datalog_environment", datalogging.environment_notes);
    row.opt("datalog_note", datalogging.note);
}

/// Template items first, in template order, then any stored keys the
/// template does not know.
fn push_checklist(row: &mut ExportRow, session: &HaSession) {
    let template = session.template();
    for item in template.items() {
        let status = template.status_of(item, &session.checklist);
        let note = session
            .checklist
            .get(&item.key)
            .map(|entry| entry.note.clone())
            .unwrap_or_default();
        push_item(row, &item.key, &ChecklistEntry { status, note });
    }
    for (key, entry) in &session.checklist {
        if template.item(key).is_none() {
            push_item(row, key, entry);
        }
    }
}

fn push_item(row: &mut ExportRow, key: &str, entry: &ChecklistEntry) {
    row.push(format!("item_{key}_status"), entry.status.as_str());
    row.push(
        format!("item_{key}_note_tag"),
        entry.note.tag.map(|t| t.as_str()).unwrap_or(""),
    );
    row.push(format!("item_{key}_note"), entry.note.text.as_str());
}

fn push_sub_checklists(row: &mut ExportRow, sheets: &SubChecklists) {
    for kind in SubChecklistKind::ALL {
        let ears: &[Option<Ear>] = if kind.is_per_ear() {
            &[Some(Ear::Right), Some(Ear::Left)]
        } else {
            &[None]
        };
        for ear in ears {
            let Ok(sheet) = sheets.sheet(kind, *ear) else {
                continue;
            };
            let prefix = match ear {
                Some(ear) => format!("{}_{}", kind.as_str(), ear.label()),
                None => kind.as_str().to_string(),
            };
            for field in sheet.field_keys() {
                row.push(
                    format!("{prefix}_{field}"),
                    tri_state::label(sheet.field(field).flatten()),
                );
            }
        }
    }
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "",
    }
}

fn transducer_label(transducer: Transducer) -> &'static str {
    match transducer {
        Transducer::Insert => "INSERT",
        Transducer::Supra => "SUPRA",
        Transducer::FreeField => "FREE_FIELD",
    }
}

fn tymp_label(tymp: TympType) -> &'static str {
    match tymp {
        TympType::A => "A",
        TympType::As => "As",
        TympType::Ad => "Ad",
        TympType::B => "B",
        TympType::C => "C",
        TympType::Unknown => "UNKNOWN",
    }
}
