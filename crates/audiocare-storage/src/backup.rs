//! Whole-store backup bundles.
//!
//! A bundle is a single JSON document: `{ version, timestamp, data: {
//! haSessions: { <key>: <session> } } }`. Bundles written by earlier app
//! versions carry more sections under `data`; those are ignored.

use std::collections::BTreeMap;

use audiocare_core::keys;
use audiocare_protocol::session::HaSession;
use audiocare_protocol::stage::Stage;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;
use crate::legacy::decode_session_value;
use crate::repository::SessionRepository;

pub const BACKUP_VERSION: &str = "2.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupBundle {
    pub version: String,
    pub timestamp: Timestamp,
    pub data: BackupData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    /// Raw session records keyed by storage key. Decoded on restore so that
    /// older records go through the same tolerant path as files on disk.
    #[serde(rename = "haSessions", default)]
    pub ha_sessions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Remove every stored session first.
    Replace,
    /// Keep stored sessions; a bundled session overwrites the stored one
    /// with the same customer and visit.
    Merge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    /// Bundle keys that could not be decoded, with the reason.
    pub skipped: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackupStats {
    pub sessions: usize,
    pub customers: usize,
    pub by_stage: BTreeMap<Stage, usize>,
}

/// Snapshot every session in `repo`.
pub fn create_backup(
    repo: &impl SessionRepository,
    now: Timestamp,
) -> Result<BackupBundle, StorageError> {
    let mut ha_sessions = BTreeMap::new();
    for session in repo.all()? {
        let key = keys::session(&session.customer_id, &session.visit_id);
        ha_sessions.insert(key, serde_json::to_value(&session)?);
    }
    tracing::info!(sessions = ha_sessions.len(), "backup created");
    Ok(BackupBundle {
        version: BACKUP_VERSION.to_string(),
        timestamp: now,
        data: BackupData { ha_sessions },
    })
}

/// Parse and check a bundle before anything is restored from it.
pub fn validate_backup(bytes: &[u8]) -> Result<BackupBundle, StorageError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| StorageError::InvalidBackup(format!("not a JSON document: {e}")))?;

    for field in ["version", "timestamp", "data"] {
        if value.get(field).is_none_or(Value::is_null) {
            return Err(StorageError::InvalidBackup(format!("missing `{field}`")));
        }
    }
    if value["version"].as_str().is_none_or(|v| v.trim().is_empty()) {
        return Err(StorageError::InvalidBackup("empty `version`".to_string()));
    }

    serde_json::from_value(value).map_err(|e| StorageError::InvalidBackup(e.to_string()))
}

/// Write a bundle's sessions into `repo`.
pub fn restore_backup(
    repo: &mut impl SessionRepository,
    bundle: &BackupBundle,
    mode: RestoreMode,
) -> Result<RestoreReport, StorageError> {
    if mode == RestoreMode::Replace {
        repo.clear()?;
    }

    let mut report = RestoreReport::default();
    for (key, raw) in &bundle.data.ha_sessions {
        match decode_session_value(raw.clone()) {
            Ok(session) => {
                repo.save(&session)?;
                report.restored += 1;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "skipping session in backup");
                report.skipped.push((key.clone(), e.to_string()));
            }
        }
    }

    tracing::info!(
        mode = ?mode,
        restored = report.restored,
        skipped = report.skipped.len(),
        "backup restored"
    );
    Ok(report)
}

/// Counts for a confirmation prompt before restoring.
pub fn backup_stats(bundle: &BackupBundle) -> BackupStats {
    let sessions: Vec<HaSession> = bundle
        .data
        .ha_sessions
        .values()
        .filter_map(|raw| decode_session_value(raw.clone()).ok())
        .collect();

    let mut by_stage = BTreeMap::new();
    for session in &sessions {
        *by_stage.entry(session.stage).or_insert(0) += 1;
    }
    let mut customers: Vec<_> = sessions.iter().map(|s| &s.customer_id).collect();
    customers.sort();
    customers.dedup();

    BackupStats {
        sessions: sessions.len(),
        customers: customers.len(),
        by_stage,
    }
}
