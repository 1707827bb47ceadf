pub mod aftercare;
pub mod ha1;
pub mod ha2;
pub mod ha3;

use crate::checklist::{ChecklistItem, ItemStatus, NoteTag, Section};
use crate::sub_checklists::SubChecklistKind;

/// A required item that defaults to done.
fn required(key: &str, label: &str, section: Section) -> ChecklistItem {
    ChecklistItem {
        key: key.to_string(),
        label: label.to_string(),
        section,
        required: true,
        default_status: ItemStatus::Done,
        sub_checklist: None,
        note_options: Vec::new(),
    }
}

fn optional(key: &str, label: &str, section: Section) -> ChecklistItem {
    ChecklistItem {
        required: false,
        ..required(key, label, section)
    }
}

impl ChecklistItem {
    fn opens(mut self, kind: SubChecklistKind) -> Self {
        self.sub_checklist = Some(kind);
        self
    }

    fn tags(mut self, tags: &[NoteTag]) -> Self {
        self.note_options = tags.to_vec();
        self
    }

    fn defaults_to(mut self, status: ItemStatus) -> Self {
        self.default_status = status;
        self
    }
}
