use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use audiocare_core::ids::{CustomerId, VisitId};
use audiocare_core::keys;
use audiocare_protocol::session::HaSession;

use crate::error::StorageError;
use crate::legacy::decode_session;
use crate::repository::{SessionRepository, sort_by_visit};

/// One pretty-printed JSON file per session under a data directory, laid
/// out by [`keys::session`].
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(root.join(keys::SESSIONS_PREFIX))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self, customer: &CustomerId, visit: &VisitId) -> Result<PathBuf, StorageError> {
        customer.validate()?;
        visit.validate()?;
        Ok(self.root.join(keys::session(customer, visit)))
    }

    fn customer_dir(&self, customer: &CustomerId) -> Result<PathBuf, StorageError> {
        customer.validate()?;
        Ok(self.root.join(keys::customer_sessions_prefix(customer)))
    }

    /// Atomic write: tmp file then rename.
    pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, bytes)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Decode every session file in `dir`. Files that fail to decode are
    /// logged and skipped.
    fn read_dir(&self, dir: &Path) -> Result<Vec<HaSession>, StorageError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let bytes = std::fs::read(&path)?;
            match decode_session(&bytes) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable session file");
                }
            }
        }
        Ok(sessions)
    }
}

impl SessionRepository for FileStore {
    fn load(&self, customer: &CustomerId, visit: &VisitId) -> Result<Option<HaSession>, StorageError> {
        let path = self.session_path(customer, visit)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = decode_session(&bytes)?;
        tracing::debug!(path = %path.display(), "session loaded");
        Ok(Some(session))
    }

    fn save(&mut self, session: &HaSession) -> Result<(), StorageError> {
        let path = self.session_path(&session.customer_id, &session.visit_id)?;
        let json = serde_json::to_vec_pretty(session)?;
        Self::write_atomic(&path, &json)?;
        tracing::debug!(
            path = %path.display(),
            stage = %session.stage,
            "session saved"
        );
        Ok(())
    }

    fn delete(&mut self, customer: &CustomerId, visit: &VisitId) -> Result<bool, StorageError> {
        let path = self.session_path(customer, visit)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "session deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_for_customer(&self, customer: &CustomerId) -> Result<Vec<HaSession>, StorageError> {
        let mut sessions = self.read_dir(&self.customer_dir(customer)?)?;
        sort_by_visit(&mut sessions);
        Ok(sessions)
    }

    fn all(&self) -> Result<Vec<HaSession>, StorageError> {
        let sessions_dir = self.root.join(keys::SESSIONS_PREFIX);
        let mut sessions = Vec::new();
        for entry in std::fs::read_dir(&sessions_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                sessions.extend(self.read_dir(&path)?);
            }
        }
        Ok(sessions)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let sessions_dir = self.root.join(keys::SESSIONS_PREFIX);
        match std::fs::remove_dir_all(&sessions_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        std::fs::create_dir_all(&sessions_dir)?;
        tracing::debug!(path = %sessions_dir.display(), "all sessions removed");
        Ok(())
    }
}
