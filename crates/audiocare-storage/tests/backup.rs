use audiocare_core::ids::{CustomerId, VisitId};
use audiocare_protocol::session::{HaSession, SessionMutation};
use audiocare_protocol::stage::Stage;
use audiocare_storage::backup::{
    BACKUP_VERSION, RestoreMode, backup_stats, create_backup, restore_backup, validate_backup,
};
use audiocare_storage::error::StorageError;
use audiocare_storage::file_store::FileStore;
use audiocare_storage::repository::{MemoryStore, SessionRepository};
use jiff::Timestamp;

fn t(secs: i64) -> Timestamp {
    Timestamp::from_second(secs).unwrap()
}

fn session(customer: &str, visit: &str, stage: Stage) -> HaSession {
    HaSession::create(
        CustomerId::from(customer),
        VisitId::from(visit),
        stage,
        None,
        None,
        t(1_000),
    )
}

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.save(&session("c-1", "v-1", Stage::Ha1)).unwrap();
    store.save(&session("c-1", "v-2", Stage::Ha2)).unwrap();
    store.save(&session("c-2", "v-1", Stage::Ha1)).unwrap();
    store
}

#[test]
fn bundle_survives_a_trip_through_bytes() {
    let store = seeded_store();
    let bundle = create_backup(&store, t(5_000)).unwrap();
    assert_eq!(bundle.version, BACKUP_VERSION);
    assert_eq!(bundle.data.ha_sessions.len(), 3);
    assert!(bundle.data.ha_sessions.contains_key("sessions/c-1/v-2.json"));

    let bytes = serde_json::to_vec(&bundle).unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("\"haSessions\""));
    assert_eq!(validate_backup(&bytes).unwrap(), bundle);
}

#[test]
fn stats_count_sessions_customers_and_stages() {
    let bundle = create_backup(&seeded_store(), t(5_000)).unwrap();
    let stats = backup_stats(&bundle);
    assert_eq!(stats.sessions, 3);
    assert_eq!(stats.customers, 2);
    assert_eq!(stats.by_stage.get(&Stage::Ha1), Some(&2));
    assert_eq!(stats.by_stage.get(&Stage::Ha2), Some(&1));
    assert_eq!(stats.by_stage.get(&Stage::Ha3), None);
}

#[test]
fn bundles_missing_required_parts_are_rejected() {
    let cases: [&[u8]; 5] = [
        b"not json",
        br#"{ "timestamp": "2024-01-01T00:00:00Z", "data": {} }"#,
        br#"{ "version": "2.0.0", "data": {} }"#,
        br#"{ "version": "2.0.0", "timestamp": "2024-01-01T00:00:00Z", "data": null }"#,
        br#"{ "version": " ", "timestamp": "2024-01-01T00:00:00Z", "data": {} }"#,
    ];
    for bytes in cases {
        let err = validate_backup(bytes).unwrap_err();
        assert!(matches!(err, StorageError::InvalidBackup(_)), "{err}");
    }
}

#[test]
fn older_bundles_with_extra_sections_are_accepted() {
    let bytes = br#"{
        "version": "1.4.0",
        "timestamp": "2024-01-01T09:00:00.000Z",
        "data": {
            "customers": [{ "id": "c-7" }],
            "haSessions": {
                "hasession_v-7": {
                    "customer_id": "c-7",
                    "visit_id": "v-7",
                    "ha_stage": "AFTERCARE_3MO",
                    "checklist": {}
                }
            }
        }
    }"#;
    let bundle = validate_backup(bytes).unwrap();
    let mut store = MemoryStore::new();
    let report = restore_backup(&mut store, &bundle, RestoreMode::Merge).unwrap();
    assert_eq!(report.restored, 1);
    let restored = store
        .load(&CustomerId::from("c-7"), &VisitId::from("v-7"))
        .unwrap()
        .unwrap();
    assert_eq!(restored.stage, Stage::Aftercare3Mo);
}

#[test]
fn replace_drops_sessions_not_in_the_bundle() {
    let bundle = create_backup(&seeded_store(), t(5_000)).unwrap();
    let mut target = MemoryStore::new();
    target.save(&session("c-9", "stale", Stage::Ha3)).unwrap();

    let report = restore_backup(&mut target, &bundle, RestoreMode::Replace).unwrap();
    assert_eq!(report.restored, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(target.len(), 3);
    assert!(
        target
            .load(&CustomerId::from("c-9"), &VisitId::from("stale"))
            .unwrap()
            .is_none()
    );
}

#[test]
fn merge_keeps_other_sessions_and_bundle_wins_on_conflict() {
    let bundle = create_backup(&seeded_store(), t(5_000)).unwrap();

    let mut target = MemoryStore::new();
    target.save(&session("c-9", "kept", Stage::Ha3)).unwrap();
    let edited = session("c-1", "v-1", Stage::Ha1).apply(
        SessionMutation::SetSatisfaction { score: Some(9) },
        t(9_000),
    );
    target.save(&edited).unwrap();

    restore_backup(&mut target, &bundle, RestoreMode::Merge).unwrap();
    assert_eq!(target.len(), 4);
    let merged = target
        .load(&CustomerId::from("c-1"), &VisitId::from("v-1"))
        .unwrap()
        .unwrap();
    assert_eq!(merged.validation.satisfaction_0to10, None);
}

#[test]
fn undecodable_sessions_are_skipped_and_reported() {
    let mut bundle = create_backup(&seeded_store(), t(5_000)).unwrap();
    bundle
        .data
        .ha_sessions
        .insert("sessions/bad/x.json".to_string(), serde_json::json!(["nope"]));

    let mut target = MemoryStore::new();
    let report = restore_backup(&mut target, &bundle, RestoreMode::Replace).unwrap();
    assert_eq!(report.restored, 3);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, "sessions/bad/x.json");
}

#[test]
fn restore_into_a_file_store() {
    let bundle = create_backup(&seeded_store(), t(5_000)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    restore_backup(&mut store, &bundle, RestoreMode::Replace).unwrap();

    let listed = store.list_for_customer(&CustomerId::from("c-1")).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(create_backup(&store, t(5_000)).unwrap(), bundle);
}
