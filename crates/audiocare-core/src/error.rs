use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown frequency: {0}")]
    UnknownFrequency(String),

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("invalid id: {0:?}")]
    InvalidId(String),
}
