use audiocare_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session not found: {key}")]
    NotFound { key: String },

    #[error("invalid id: {0}")]
    InvalidId(#[from] CoreError),

    #[error("malformed session record: {0}")]
    Malformed(String),

    #[error("invalid backup: {0}")]
    InvalidBackup(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
