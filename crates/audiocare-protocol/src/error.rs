use audiocare_audiometry::error::ThresholdError;
use thiserror::Error;

use crate::checklist::NoteTag;
use crate::stage::Stage;
use crate::sub_checklists::SubChecklistKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("item '{key}' is not on the {stage} checklist")]
    UnknownItem { stage: Stage, key: String },

    #[error("tag '{tag}' is not offered on item '{key}'")]
    TagNotOffered { key: String, tag: NoteTag },

    #[error("unknown field '{field}' on the {kind} checklist")]
    UnknownField {
        kind: SubChecklistKind,
        field: String,
    },

    #[error("the {kind} checklist is kept per ear; an ear is required")]
    EarRequired { kind: SubChecklistKind },

    #[error("COSI goal number must be 1, 2 or 3, got {0}")]
    GoalIndex(u8),

    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}
