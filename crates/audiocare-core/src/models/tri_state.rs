//! Tri-state checklist values.
//!
//! Every sub-checklist field is `null` (not yet looked at), `true`
//! (confirmed) or `false` (flagged).

pub type TriState = Option<bool>;

/// Advance a field one step: `null → true → false → null`.
pub fn cycle(value: TriState) -> TriState {
    match value {
        None => Some(true),
        Some(true) => Some(false),
        Some(false) => None,
    }
}

/// Short display form used in exports.
pub fn label(value: TriState) -> &'static str {
    match value {
        None => "",
        Some(true) => "O",
        Some(false) => "X",
    }
}
