use audiocare_core::models::frequency::{Frequency, Modality};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("{modality} is not tested at {frequency} Hz")]
    UnsupportedFrequency {
        modality: Modality,
        frequency: Frequency,
    },
}
