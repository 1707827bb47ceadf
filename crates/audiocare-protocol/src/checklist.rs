use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::sub_checklists::SubChecklistKind;

/// Grouping used to lay out a stage's checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Section {
    /// History, questionnaires and counseling.
    Intake,
    /// Outer and middle ear.
    Ear,
    Audiometry,
    /// Fitting and verification.
    Fitting,
    DeviceCheck,
    Education,
    Planning,
    Adjustment,
    /// Outcome validation.
    Outcome,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::Intake => "Intake / counseling",
            Section::Ear => "Ear / middle ear",
            Section::Audiometry => "Audiometry",
            Section::Fitting => "Fitting / verification",
            Section::DeviceCheck => "Device check",
            Section::Education => "Education",
            Section::Planning => "Planning",
            Section::Adjustment => "Adjustment",
            Section::Outcome => "Outcome",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ItemStatus {
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "SKIPPED")]
    Skipped,
    #[serde(rename = "N/A", alias = "N_A")]
    NotApplicable,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Done => "DONE",
            ItemStatus::Skipped => "SKIPPED",
            ItemStatus::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short qualifiers a clinician can attach to an item's note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NoteTag {
    Aided,
    Unaided,
    MaskingUsed,
    NoMasking,
    Insert,
    Supra,
    Referred,
    NotReferred,
}

impl NoteTag {
    pub const ALL: [NoteTag; 8] = [
        NoteTag::Aided,
        NoteTag::Unaided,
        NoteTag::MaskingUsed,
        NoteTag::NoMasking,
        NoteTag::Insert,
        NoteTag::Supra,
        NoteTag::Referred,
        NoteTag::NotReferred,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoteTag::Aided => "aided",
            NoteTag::Unaided => "unaided",
            NoteTag::MaskingUsed => "masking_used",
            NoteTag::NoMasking => "no_masking",
            NoteTag::Insert => "insert",
            NoteTag::Supra => "supra",
            NoteTag::Referred => "referred",
            NoteTag::NotReferred => "not_referred",
        }
    }

    pub fn parse(s: &str) -> Option<NoteTag> {
        NoteTag::ALL.into_iter().find(|tag| tag.as_str() == s.trim())
    }
}

impl fmt::Display for NoteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text note on a checklist item, optionally qualified by a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ItemNote {
    pub tag: Option<NoteTag>,
    pub text: String,
}

impl ItemNote {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: None,
            text: text.into(),
        }
    }

    pub fn tagged(tag: NoteTag, text: impl Into<String>) -> Self {
        Self {
            tag: Some(tag),
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.text.trim().is_empty()
    }
}

/// Recorded state of one checklist item in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChecklistEntry {
    pub status: ItemStatus,
    #[serde(default)]
    pub note: ItemNote,
}

impl ChecklistEntry {
    pub fn new(status: ItemStatus) -> Self {
        Self {
            status,
            note: ItemNote::default(),
        }
    }
}

/// One line of a stage template.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChecklistItem {
    pub key: String,
    pub label: String,
    pub section: Section,
    pub required: bool,
    pub default_status: ItemStatus,
    /// Detailed tri-state checklist opened from this item, if any.
    pub sub_checklist: Option<SubChecklistKind>,
    /// Tags offered on this item's note.
    pub note_options: Vec<NoteTag>,
}

impl ChecklistItem {
    pub fn offers(&self, tag: NoteTag) -> bool {
        self.note_options.contains(&tag)
    }
}
