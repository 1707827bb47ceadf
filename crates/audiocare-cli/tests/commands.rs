use audiocare_cli::cli::{ExportFormat, VisitRef};
use audiocare_cli::commands;
use audiocare_core::models::ear::Ear;
use audiocare_core::models::frequency::{Frequency, Modality};
use audiocare_protocol::stage::Stage;
use audiocare_storage::file_store::FileStore;
use audiocare_storage::repository::{MemoryStore, SessionRepository};
use jiff::Timestamp;
use jiff::civil::date;

fn t(secs: i64) -> Timestamp {
    Timestamp::from_second(secs).unwrap()
}

fn target(customer: &str, visit: &str) -> VisitRef {
    VisitRef {
        customer: customer.to_string(),
        visit: visit.to_string(),
    }
}

const AUDIOGRAM: &str = r#"[
    { "op": "set_threshold", "ear": "right", "modality": "ac", "frequency": "500", "value": 40 },
    { "op": "set_threshold", "ear": "right", "modality": "ac", "frequency": "1000", "value": 50 },
    { "op": "toggle_no_response", "ear": "left", "modality": "ac", "frequency": "4000" }
]"#;

#[test]
fn new_session_is_seeded_from_the_previous_visit() {
    let mut store = MemoryStore::new();
    commands::new_session(&mut store, "c-1", Some("v-1"), Stage::Ha1, Some(date(2024, 5, 1)), t(1))
        .unwrap();
    let mutations = commands::parse_mutations(AUDIOGRAM).unwrap();
    commands::apply_mutations(&mut store, &target("c-1", "v-1"), mutations, t(2)).unwrap();

    let second = commands::new_session(
        &mut store,
        "c-1",
        Some("v-2"),
        Stage::Ha2,
        Some(date(2024, 5, 8)),
        t(3),
    )
    .unwrap();
    let pure_tone = second.results.pure_tone.unwrap();
    assert!(!pure_tone.performed);
    assert_eq!(
        pure_tone.thresholds(Ear::Right, Modality::Ac).get(Frequency::Hz1000),
        Some(50)
    );
    assert!(pure_tone.nr.contains(Ear::Left, Modality::Ac, Frequency::Hz4000));
}

#[test]
fn duplicate_and_invalid_visits_are_refused() {
    let mut store = MemoryStore::new();
    commands::new_session(&mut store, "c-1", Some("v-1"), Stage::Ha1, None, t(1)).unwrap();
    assert!(commands::new_session(&mut store, "c-1", Some("v-1"), Stage::Ha1, None, t(2)).is_err());
    assert!(commands::new_session(&mut store, "c/1", None, Stage::Ha1, None, t(2)).is_err());
    assert_eq!(store.len(), 1);
}

#[test]
fn generated_visit_ids_are_usable() {
    let mut store = MemoryStore::new();
    let session = commands::new_session(&mut store, "c-1", None, Stage::Ha3, None, t(1)).unwrap();
    assert!(session.visit_id.validate().is_ok());
    let loaded = commands::load_session(&store, &target("c-1", session.visit_id.as_str()));
    assert!(loaded.is_ok());
}

#[test]
fn refused_edit_saves_nothing() {
    let mut store = MemoryStore::new();
    commands::new_session(&mut store, "c-1", Some("v-1"), Stage::Ha1, None, t(1)).unwrap();
    let mutations = commands::parse_mutations(
        r#"[
            { "op": "set_satisfaction", "score": 6 },
            { "op": "set_item_status", "key": "no_such_item", "status": "DONE" }
        ]"#,
    )
    .unwrap();
    let err = commands::apply_mutations(&mut store, &target("c-1", "v-1"), mutations, t(2))
        .unwrap_err();
    assert!(err.to_string().contains("#2"));

    let stored = commands::load_session(&store, &target("c-1", "v-1")).unwrap();
    assert_eq!(stored.validation.satisfaction_0to10, None);
    assert_eq!(stored.updated_at, t(1));
}

#[test]
fn single_object_and_bad_json_edits() {
    assert_eq!(
        commands::parse_mutations(r#"{ "op": "set_satisfaction", "score": 3 }"#)
            .unwrap()
            .len(),
        1
    );
    assert!(commands::parse_mutations("{ nope").is_err());
    assert!(commands::parse_mutations(r#"{ "op": "launch" }"#).is_err());
}

#[test]
fn missing_session_is_an_error() {
    let store = MemoryStore::new();
    let err = commands::load_session(&store, &target("c-1", "v-404")).unwrap_err();
    assert!(err.to_string().contains("sessions/c-1/v-404.json"));
}

#[test]
fn missing_and_list_output() {
    let mut store = MemoryStore::new();
    commands::new_session(&mut store, "c-1", Some("v-1"), Stage::Ha1, Some(date(2024, 5, 1)), t(1))
        .unwrap();
    let mutations = commands::parse_mutations(
        r#"{ "op": "set_item_status", "key": "otoscopy", "status": "SKIPPED" }"#,
    )
    .unwrap();
    let session =
        commands::apply_mutations(&mut store, &target("c-1", "v-1"), mutations, t(2)).unwrap();

    let mut out = Vec::new();
    commands::missing(&session, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("otoscopy\t"));

    let mut out = Vec::new();
    commands::list(&store, "c-1", &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "v-1\t2024-05-01\tHA_1\t1 missing\n");
}

#[test]
fn export_filters_by_customer() {
    let mut store = MemoryStore::new();
    commands::new_session(&mut store, "c-1", Some("v-1"), Stage::Ha1, None, t(1)).unwrap();
    commands::new_session(&mut store, "c-2", Some("v-1"), Stage::Ha2, None, t(1)).unwrap();

    let mut out = Vec::new();
    let count = commands::export(&store, Some("c-2"), ExportFormat::Tsv, &mut out).unwrap();
    assert_eq!(count, 1);
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);

    let mut out = Vec::new();
    let count = commands::export(&store, None, ExportFormat::Json, &mut out).unwrap();
    assert_eq!(count, 2);
    let rows: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(rows.as_array().map(Vec::len), Some(2));
}

#[test]
fn export_into_a_directory_is_named_after_the_clinic() {
    let dir = tempfile::tempdir().unwrap();

    let path = commands::export_path(
        dir.path().to_path_buf(),
        Some("Seoul Hearing Center"),
        ExportFormat::Tsv,
        t(1_700_000_000),
    );
    assert_eq!(path, dir.path().join("seoul-hearing-center-export-1700000000.tsv"));

    let unnamed = commands::export_path(dir.path().to_path_buf(), None, ExportFormat::Json, t(5));
    assert_eq!(unnamed, dir.path().join("audiocare-export-5.json"));
    assert_eq!(
        commands::export_file_name(Some(" / "), ExportFormat::Json, t(5)),
        "audiocare-export-5.json"
    );

    let file = dir.path().join("mine.tsv");
    assert_eq!(
        commands::export_path(file.clone(), Some("Clinic"), ExportFormat::Tsv, t(5)),
        file
    );
}

#[test]
fn backup_then_restore_into_a_fresh_directory() {
    let source_dir = tempfile::tempdir().unwrap();
    let mut source = FileStore::open(source_dir.path()).unwrap();
    commands::new_session(&mut source, "c-1", Some("v-1"), Stage::Ha1, None, t(1)).unwrap();
    commands::new_session(&mut source, "c-1", Some("v-2"), Stage::Ha2, None, t(2)).unwrap();

    let path = commands::backup(&source, source_dir.path(), None, t(100)).unwrap();
    assert!(path.starts_with(source_dir.path().join("backups")));

    let target_dir = tempfile::tempdir().unwrap();
    let mut target = FileStore::open(target_dir.path()).unwrap();

    let mut out = Vec::new();
    commands::restore(&mut target, &path, false, true, &mut out).unwrap();
    assert!(String::from_utf8_lossy(&out).contains("2 sessions, 1 customers"));
    assert!(target.all().unwrap().is_empty());

    let mut out = Vec::new();
    commands::restore(&mut target, &path, true, false, &mut out).unwrap();
    assert!(String::from_utf8_lossy(&out).contains("restored 2 sessions"));
    assert_eq!(target.all().unwrap().len(), 2);
}
