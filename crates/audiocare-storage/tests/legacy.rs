use audiocare_audiometry::speech::SpeechCondition;
use audiocare_audiometry::speech::SpeechMetric;
use audiocare_core::models::ear::Ear;
use audiocare_core::models::frequency::{Frequency, Modality};
use audiocare_protocol::checklist::{ItemNote, ItemStatus, NoteTag};
use audiocare_protocol::stage::Stage;
use audiocare_storage::legacy::{decode_session, decode_session_value, parse_legacy_note};

const LEGACY_RECORD: &str = r#"{
  "id": "hasession_v-9",
  "customer_id": "c-9",
  "visit_id": "v-9",
  "visit_date": "2024-03-04",
  "ha_stage": "HA_1",
  "created_at": "2024-03-04T01:00:00.000Z",
  "updated_at": "2024-03-04T02:30:00.000Z",
  "checklist": {
    "pure_tone_bc": { "status": "DONE", "note": "[masking_used] right ear" },
    "tympanometry": { "status": "N/A", "note": null },
    "intake_review": { "status": "SKIPPED", "note": "[보청기] free text" }
  },
  "results_detailed": {
    "pure_tone": {
      "performed": true,
      "test_date": null,
      "transducer": "INSERT",
      "ac_dbhl": {
        "right": { "500": 20, "1000": 25, "2000": 30, "4000": 35, "1200": 50 },
        "left": { "500": 40.0, "1000": null }
      },
      "bc_dbhl": { "right": { "500": 15 }, "left": {} },
      "sf_dbhl": { "right": {}, "left": {} },
      "nr": { "right": ["2000"], "left": [], "sf_right": [], "sf_left": [] },
      "masking_used": null,
      "notes": null,
      "derived": { "pta_right": 27.5, "pta_left": null, "pta_sf_right": null, "pta_sf_left": null }
    },
    "speech": {
      "performed": true,
      "srt_dbhl": { "right": [30, 35], "left": null, "free_field": [], "free_field_right": null, "free_field_left": null },
      "mcl_dbhl": { "right": null, "left": null, "free_field": null, "free_field_right": null, "free_field_left": null },
      "ucl_dbhl": { "right": null, "left": null, "free_field": null, "free_field_right": null, "free_field_left": null },
      "wrs": {
        "right": { "list_id": "A", "level_dbhl": 70, "score_percent": [88] },
        "left": { "list_id": null, "level_dbhl": null, "score_percent": [] },
        "free_field": null, "free_field_right": null, "free_field_left": null,
        "notes": "patient tired"
      }
    },
    "middle_ear": {
      "performed": true,
      "otoscopy": {
        "right": "clear", "left": null, "notes": null,
        "checklistRight": { "earwax": true, "lightReflex": false }
      },
      "tympanometry": {
        "right": { "type": "A", "peak_pressure_daPa": -20, "compliance_ml": 0.7, "ecv_ml": 1.2 },
        "left": { "type": null, "peak_pressure_daPa": null, "compliance_ml": null, "ecv_ml": null },
        "notes": null,
        "checklistLeft": { "typeComplete": true }
      }
    },
    "fitComfortChecklist": { "domeMoldFit": true, "painDiscomfort": null }
  },
  "adjustments": { "programming_summary": null, "gain_change_summary": "+3 dB HF", "noise_program_change": null, "feedback_management": null, "occlusion_management": null },
  "education": { "insertion_removal": true, "battery_charging": null, "cleaning_care": false, "app_bluetooth": null, "adaptation_schedule_given": null, "communication_strategies": null },
  "validation": { "satisfaction_0to10": 8 }
}"#;

#[test]
fn legacy_record_decodes_into_current_shape() {
    let session = decode_session(LEGACY_RECORD.as_bytes()).unwrap();
    assert_eq!(session.stage, Stage::Ha1);
    assert_eq!(session.visit_id.as_str(), "v-9");
    assert_eq!(session.adjustments.gain_change_summary.as_deref(), Some("+3 dB HF"));
    assert_eq!(session.education.cleaning_care, Some(false));
    assert_eq!(session.validation.satisfaction_0to10, Some(8));
}

#[test]
fn checklist_notes_are_split_into_tag_and_text() {
    let session = decode_session(LEGACY_RECORD.as_bytes()).unwrap();
    let bc = &session.checklist["pure_tone_bc"];
    assert_eq!(bc.note, ItemNote::tagged(NoteTag::MaskingUsed, "right ear"));

    let tymp = &session.checklist["tympanometry"];
    assert_eq!(tymp.status, ItemStatus::NotApplicable);
    assert_eq!(tymp.note, ItemNote::default());

    // Unknown bracket text is kept verbatim.
    assert_eq!(session.checklist["intake_review"].note.tag, None);
    assert_eq!(session.checklist["intake_review"].note.text, "[보청기] free text");
}

#[test]
fn thresholds_are_cleaned_and_averages_recomputed() {
    let session = decode_session(LEGACY_RECORD.as_bytes()).unwrap();
    let pure_tone = session.results.pure_tone.as_ref().unwrap();

    assert_eq!(pure_tone.thresholds(Ear::Left, Modality::Ac).get(Frequency::Hz500), Some(40));
    assert!(pure_tone.thresholds(Ear::Right, Modality::Ac).0.len() == 4);

    // The shared right-ear NR flag applies to AC and BC at 2000 Hz.
    assert!(pure_tone.nr.contains(Ear::Right, Modality::Ac, Frequency::Hz2000));
    assert!(pure_tone.nr.contains(Ear::Right, Modality::Bc, Frequency::Hz2000));

    // (20 + 25 + 35) / 3 with 2000 Hz excluded as no-response.
    assert_eq!(pure_tone.derived().ac_pta4(Ear::Right), Some(27));
    assert_eq!(pure_tone.derived().ac_pta4(Ear::Left), Some(40));
}

#[test]
fn speech_trials_collapse_to_the_first() {
    let session = decode_session(LEGACY_RECORD.as_bytes()).unwrap();
    let speech = session.results.speech.as_ref().unwrap();
    assert_eq!(speech.value(SpeechCondition::Right, SpeechMetric::Srt), Some(30));
    assert_eq!(speech.value(SpeechCondition::FreeField, SpeechMetric::Srt), None);
    assert_eq!(speech.wrs_score(SpeechCondition::Right), Some(88));
    assert!(speech.wrs(SpeechCondition::Left).is_none());
    assert_eq!(speech.notes.as_deref(), Some("patient tired"));
}

#[test]
fn sub_checklists_move_to_their_new_home() {
    let session = decode_session(LEGACY_RECORD.as_bytes()).unwrap();
    let sheets = &session.results.sub_checklists;
    assert_eq!(sheets.otoscopy.right.earwax, Some(true));
    assert_eq!(sheets.otoscopy.right.light_reflex, Some(false));
    assert_eq!(sheets.otoscopy.left.earwax, None);
    assert_eq!(sheets.tympanometry.left.type_complete, Some(true));
    assert_eq!(sheets.fit_comfort.dome_mold_fit, Some(true));
    assert_eq!(sheets.fit_comfort.pain_discomfort, None);

    let middle_ear = session.results.middle_ear.as_ref().unwrap();
    assert_eq!(middle_ear.otoscopy.right.as_deref(), Some("clear"));
    assert_eq!(middle_ear.tympanometry.left.tymp_type, None);
}

#[test]
fn current_records_decode_unchanged() {
    let session = decode_session(LEGACY_RECORD.as_bytes()).unwrap();
    let json = serde_json::to_vec(&session).unwrap();
    assert_eq!(decode_session(&json).unwrap(), session);
}

#[test]
fn fractional_and_out_of_range_ratings_are_rounded() {
    let with_validation = |validation: serde_json::Value| {
        let mut record: serde_json::Value = serde_json::from_str(LEGACY_RECORD).unwrap();
        record["validation"] = validation;
        decode_session_value(record).unwrap().validation
    };

    let validation = with_validation(serde_json::json!({
        "satisfaction_0to10": 7.5,
        "cosi_top3_review": { "goal1": "phone calls", "improvement_1": 2.5, "improvement_2": "3" }
    }));
    assert_eq!(validation.satisfaction_0to10, Some(8));
    let review = validation.cosi_top3_review.unwrap();
    assert_eq!(review.goal1.as_deref(), Some("phone calls"));
    assert_eq!(review.improvement_1, Some(3));
    assert_eq!(review.improvement_2, Some(3));

    let high = with_validation(serde_json::json!({ "satisfaction_0to10": 14 }));
    assert_eq!(high.satisfaction_0to10, Some(10));
    let negative = with_validation(serde_json::json!({ "satisfaction_0to10": -2 }));
    assert_eq!(negative.satisfaction_0to10, Some(0));
    let unreadable = with_validation(serde_json::json!({ "satisfaction_0to10": "n/a" }));
    assert_eq!(unreadable.satisfaction_0to10, None);
}

#[test]
fn note_parsing() {
    assert_eq!(parse_legacy_note("[aided] 45%"), ItemNote::tagged(NoteTag::Aided, "45%"));
    assert_eq!(parse_legacy_note("  plain  "), ItemNote::text("plain"));
    assert_eq!(parse_legacy_note("[unclosed"), ItemNote::text("[unclosed"));
    assert_eq!(parse_legacy_note("[referred]"), ItemNote::tagged(NoteTag::Referred, ""));
}

#[test]
fn non_object_records_are_rejected() {
    assert!(decode_session(b"[1, 2, 3]").is_err());
    assert!(decode_session(b"not json").is_err());
    assert!(decode_session(br#"{ "customer_id": "c" }"#).is_err());
}
