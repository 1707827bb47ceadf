use std::collections::{BTreeMap, HashSet};

use audiocare_protocol::checklist::{ChecklistEntry, ItemStatus};
use audiocare_protocol::stage::{NextVisitRule, Stage};
use audiocare_protocol::sub_checklists::{OtoscopyChecklist, SubChecklistKind, TriStateFields};
use audiocare_protocol::{all_templates, missing_required, template};
use jiff::civil::date;

fn keys(stage: Stage) -> Vec<String> {
    template(stage).items().iter().map(|i| i.key.clone()).collect()
}

#[test]
fn every_stage_has_a_template() {
    let templates = all_templates();
    assert_eq!(templates.len(), 4);
    for stage in Stage::ALL {
        assert!(templates.iter().any(|t| t.stage() == stage));
        assert_eq!(template(stage).stage(), stage);
    }
}

#[test]
fn template_sizes_and_order() {
    assert_eq!(keys(Stage::Ha1).len(), 14);
    assert_eq!(keys(Stage::Ha2).len(), 13);
    assert_eq!(keys(Stage::Ha3).len(), 9);
    assert_eq!(keys(Stage::Aftercare3Mo).len(), 12);

    assert_eq!(keys(Stage::Ha1).first().map(String::as_str), Some("intake_review"));
    assert_eq!(keys(Stage::Ha1).last().map(String::as_str), Some("schedule_next"));
    assert_eq!(keys(Stage::Ha3).last().map(String::as_str), Some("switch_to_aftercare"));
}

#[test]
fn keys_are_unique_within_a_stage() {
    for stage in Stage::ALL {
        let all = keys(stage);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len(), "{stage}");
    }
}

#[test]
fn aftercare_optional_tests_default_to_not_applicable() {
    let aftercare = template(Stage::Aftercare3Mo);
    for key in ["tymp_needed", "retest_needed"] {
        let item = aftercare.item(key).unwrap();
        assert_eq!(item.default_status, ItemStatus::NotApplicable);
        assert!(!item.required);
    }
    assert_eq!(
        aftercare.item("otoscopy").unwrap().default_status,
        ItemStatus::Done
    );
}

#[test]
fn default_checklist_has_nothing_missing() {
    for stage in Stage::ALL {
        let checklist = template(stage).default_checklist();
        assert_eq!(checklist.len(), keys(stage).len());
        assert!(missing_required(stage, &checklist).is_empty(), "{stage}");
    }
}

#[test]
fn skipped_required_items_are_reported_in_template_order() {
    let mut checklist = template(Stage::Ha1).default_checklist();
    checklist.insert("schedule_next".into(), ChecklistEntry::new(ItemStatus::Skipped));
    checklist.insert("otoscopy".into(), ChecklistEntry::new(ItemStatus::NotApplicable));
    checklist.insert("tympanometry".into(), ChecklistEntry::new(ItemStatus::Skipped));

    let missing: Vec<_> = missing_required(Stage::Ha1, &checklist)
        .into_iter()
        .map(|i| i.key.as_str())
        .collect();
    assert_eq!(missing, vec!["otoscopy", "schedule_next"]);
}

#[test]
fn untouched_items_count_at_their_default() {
    let empty = BTreeMap::new();
    assert!(missing_required(Stage::Ha2, &empty).is_empty());

    let first = template(Stage::Aftercare3Mo).first_incomplete(&empty).unwrap();
    assert_eq!(first.key, "tymp_needed");
}

#[test]
fn items_name_the_sheet_they_open() {
    let ha1 = template(Stage::Ha1);
    assert_eq!(ha1.item("otoscopy").unwrap().sub_checklist, Some(SubChecklistKind::Otoscopy));
    assert_eq!(
        ha1.item("device_plan").unwrap().sub_checklist,
        Some(SubChecklistKind::DevicePlan)
    );
    assert_eq!(ha1.item("intake_review").unwrap().sub_checklist, None);
    assert_eq!(
        template(Stage::Ha2).item("rem_verification").unwrap().sub_checklist,
        Some(SubChecklistKind::Rem)
    );
}

#[test]
fn stage_progression_and_next_visit() {
    assert_eq!(Stage::Ha1.next(), Stage::Ha2);
    assert_eq!(Stage::Ha3.next(), Stage::Aftercare3Mo);
    assert_eq!(Stage::Aftercare3Mo.next(), Stage::Aftercare3Mo);

    assert_eq!(Stage::Ha2.next_visit_rule(), NextVisitRule::Weekly);
    assert_eq!(
        Stage::Ha1.recommended_next_visit(date(2024, 5, 1)),
        date(2024, 5, 8)
    );
    assert_eq!(
        Stage::Ha3.recommended_next_visit(date(2024, 5, 1)),
        date(2024, 7, 30)
    );
}

#[test]
fn stage_wire_names() {
    assert_eq!(serde_json::to_string(&Stage::Aftercare3Mo).unwrap(), r#""AFTERCARE_3MO""#);
    assert_eq!("HA_2".parse::<Stage>().unwrap(), Stage::Ha2);
    assert!("HA_4".parse::<Stage>().is_err());
}

#[test]
fn item_status_accepts_both_not_applicable_spellings() {
    let a: ItemStatus = serde_json::from_str(r#""N/A""#).unwrap();
    let b: ItemStatus = serde_json::from_str(r#""N_A""#).unwrap();
    assert_eq!(a, ItemStatus::NotApplicable);
    assert_eq!(b, ItemStatus::NotApplicable);
    assert_eq!(serde_json::to_string(&a).unwrap(), r#""N/A""#);
}

#[test]
fn sheet_fields_are_addressed_by_stored_key() {
    let mut sheet = OtoscopyChecklist::default();
    assert!(sheet.set_field("lightReflex", Some(true)));
    assert!(!sheet.set_field("light_reflex", Some(true)));
    assert_eq!(sheet.field("lightReflex"), Some(Some(true)));
    assert_eq!(sheet.field("earwax"), Some(None));
    assert_eq!(sheet.field("bogus"), None);
    assert_eq!(sheet.answered(), 1);

    let json = serde_json::to_value(&sheet).unwrap();
    assert_eq!(json["lightReflex"], serde_json::json!(true));
}

#[test]
fn every_kind_lists_its_fields() {
    for kind in SubChecklistKind::ALL {
        assert!(!kind.fields().is_empty(), "{kind}");
        assert_eq!(SubChecklistKind::parse(kind.as_str()), Some(kind));
    }
    assert!(SubChecklistKind::Tympanometry.is_per_ear());
    assert!(!SubChecklistKind::Rem.is_per_ear());
}
