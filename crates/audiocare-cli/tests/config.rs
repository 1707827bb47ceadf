use std::path::PathBuf;

use audiocare_cli::config::{
    AudiocareConfig, CURRENT_VERSION, LogFormat, load_config, load_or_init, migrate, save_config,
};
use serde_json::json;

fn sample() -> AudiocareConfig {
    AudiocareConfig {
        config_version: CURRENT_VERSION,
        data_dir: PathBuf::from("/srv/audiocare"),
        log_format: LogFormat::Json,
        clinic_name: Some("Riverside Hearing".to_string()),
        created_at: "2024-05-01T09:00:00Z".parse().unwrap(),
    }
}

#[test]
fn pre_versioned_config_is_migrated_to_current() {
    let v0 = json!({
        "storage_dir": "/var/lib/clinic",
        "created_at": "2023-01-01T00:00:00Z"
    });
    let migrated = migrate(v0, 0).unwrap();
    assert_eq!(migrated["config_version"], CURRENT_VERSION);
    assert_eq!(migrated["data_dir"], "/var/lib/clinic");
    assert!(migrated.get("storage_dir").is_none());
    assert_eq!(migrated["log_format"], "pretty");
    assert!(migrated["clinic_name"].is_null());

    let config: AudiocareConfig = serde_json::from_value(migrated).unwrap();
    assert_eq!(config.log_format, LogFormat::Pretty);
}

#[test]
fn migration_keeps_values_already_present() {
    let v1 = json!({
        "config_version": 1,
        "data_dir": "/data",
        "log_format": "json",
        "created_at": "2023-01-01T00:00:00Z"
    });
    let migrated = migrate(v1, 1).unwrap();
    assert_eq!(migrated["log_format"], "json");
    assert_eq!(migrated["config_version"], 2);
}

#[test]
fn newer_config_is_refused() {
    let err = migrate(json!({}), CURRENT_VERSION + 1).unwrap_err();
    assert!(err.to_string().contains("newer"));
    assert!(migrate(json!([1, 2]), 0).is_err());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let mut config = sample();
    config.config_version = 0;

    save_config(&path, &config).unwrap();
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.config_version, CURRENT_VERSION);
    assert_eq!(loaded.data_dir, config.data_dir);
    assert_eq!(loaded.clinic_name, config.clinic_name);
}

#[cfg(unix)]
#[test]
fn saved_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    save_config(&path, &sample()).unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn existing_config_is_loaded_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    save_config(&path, &sample()).unwrap();
    let loaded = load_or_init(&path).unwrap();
    assert_eq!(loaded.clinic_name.as_deref(), Some("Riverside Hearing"));
}
