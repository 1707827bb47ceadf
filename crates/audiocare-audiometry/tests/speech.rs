use audiocare_audiometry::speech::{Speech, SpeechCondition, SpeechMetric, WrsField};

#[test]
fn first_non_null_write_marks_performed() {
    let mut speech = Speech::default();
    speech.set_value(SpeechCondition::Right, SpeechMetric::Srt, None);
    assert!(!speech.performed);

    speech.set_value(SpeechCondition::Right, SpeechMetric::Srt, Some(35));
    assert!(speech.performed);
    assert_eq!(speech.value(SpeechCondition::Right, SpeechMetric::Srt), Some(35));

    speech.set_value(SpeechCondition::Right, SpeechMetric::Srt, None);
    assert!(speech.performed);
    assert_eq!(speech.value(SpeechCondition::Right, SpeechMetric::Srt), None);
}

#[test]
fn conditions_are_independent() {
    let mut speech = Speech::default();
    speech.set_value(SpeechCondition::FreeFieldLeft, SpeechMetric::Mcl, Some(55));
    speech.set_value(SpeechCondition::Left, SpeechMetric::Ucl, Some(95));

    assert_eq!(speech.value(SpeechCondition::FreeFieldLeft, SpeechMetric::Mcl), Some(55));
    assert_eq!(speech.value(SpeechCondition::FreeField, SpeechMetric::Mcl), None);
    assert_eq!(speech.value(SpeechCondition::Left, SpeechMetric::Ucl), Some(95));
    assert_eq!(speech.value(SpeechCondition::Left, SpeechMetric::Mcl), None);
}

#[test]
fn word_recognition_fields_build_one_entry() {
    let mut speech = Speech::default();
    speech.set_wrs(SpeechCondition::Right, WrsField::ListId(Some("KS-1".into())));
    speech.set_wrs(SpeechCondition::Right, WrsField::LevelDbhl(Some(70)));
    speech.set_wrs(SpeechCondition::Right, WrsField::ScorePercent(Some(88)));

    let wrs = speech.wrs(SpeechCondition::Right).unwrap();
    assert_eq!(wrs.list_id.as_deref(), Some("KS-1"));
    assert_eq!(wrs.level_dbhl, Some(70));
    assert_eq!(speech.wrs_score(SpeechCondition::Right), Some(88));
    assert!(speech.performed);
}

#[test]
fn clearing_every_wrs_field_removes_the_entry() {
    let mut speech = Speech::default();
    speech.set_wrs(SpeechCondition::FreeField, WrsField::ScorePercent(Some(60)));
    speech.set_wrs(SpeechCondition::FreeField, WrsField::ScorePercent(None));
    assert!(speech.wrs(SpeechCondition::FreeField).is_none());
    assert!(!speech.has_data());
}

#[test]
fn carried_over_copy_keeps_values_but_not_performed() {
    let mut speech = Speech::default();
    speech.set_value(SpeechCondition::Left, SpeechMetric::Srt, Some(40));
    let copy = speech.carried_over();
    assert!(!copy.performed);
    assert_eq!(copy.value(SpeechCondition::Left, SpeechMetric::Srt), Some(40));
}

#[test]
fn missing_fields_deserialize_as_untested() {
    let speech: Speech = serde_json::from_str(r#"{ "srt_dbhl": { "left": 30 } }"#).unwrap();
    assert!(!speech.performed);
    assert_eq!(speech.value(SpeechCondition::Left, SpeechMetric::Srt), Some(30));
    assert_eq!(speech.value(SpeechCondition::Right, SpeechMetric::Srt), None);
    assert!(speech.wrs(SpeechCondition::Right).is_none());
}
