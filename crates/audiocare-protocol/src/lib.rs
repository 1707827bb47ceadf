//! audiocare-protocol
//!
//! The hearing-aid fitting protocol: stage checklist templates, detailed
//! tri-state sub-checklists, and the [`session::HaSession`] aggregate that
//! ties them to the audiometric results of one visit.

pub mod checklist;
pub mod error;
pub mod session;
pub mod stage;
pub mod stages;
pub mod sub_checklists;
pub mod summary;

use std::collections::BTreeMap;

use checklist::{ChecklistEntry, ChecklistItem, ItemStatus};
use stage::Stage;

/// Checklist template for one protocol stage.
pub trait StageTemplate: Send + Sync {
    fn stage(&self) -> Stage;

    /// Items in display order. Keys are unique within a stage.
    fn items(&self) -> &[ChecklistItem];

    fn item(&self, key: &str) -> Option<&ChecklistItem> {
        self.items().iter().find(|item| item.key == key)
    }

    /// A fresh checklist with every item at its default status.
    fn default_checklist(&self) -> BTreeMap<String, ChecklistEntry> {
        self.items()
            .iter()
            .map(|item| (item.key.clone(), ChecklistEntry::new(item.default_status)))
            .collect()
    }

    /// Status of `item` in `checklist`; items never touched keep their default.
    fn status_of(
        &self,
        item: &ChecklistItem,
        checklist: &BTreeMap<String, ChecklistEntry>,
    ) -> ItemStatus {
        checklist
            .get(&item.key)
            .map_or(item.default_status, |entry| entry.status)
    }

    /// Required items not marked done, in template order.
    fn missing_required(&self, checklist: &BTreeMap<String, ChecklistEntry>) -> Vec<&ChecklistItem> {
        self.items()
            .iter()
            .filter(|item| item.required && self.status_of(item, checklist) != ItemStatus::Done)
            .collect()
    }

    /// First item, in template order, that is not done.
    fn first_incomplete(&self, checklist: &BTreeMap<String, ChecklistEntry>) -> Option<&ChecklistItem> {
        self.items()
            .iter()
            .find(|item| self.status_of(item, checklist) != ItemStatus::Done)
    }
}

/// Return every stage template.
pub fn all_templates() -> Vec<Box<dyn StageTemplate>> {
    vec![
        Box::new(stages::ha1::Ha1),
        Box::new(stages::ha2::Ha2),
        Box::new(stages::ha3::Ha3),
        Box::new(stages::aftercare::Aftercare3Mo),
    ]
}

/// The template for `stage`.
pub fn template(stage: Stage) -> &'static dyn StageTemplate {
    match stage {
        Stage::Ha1 => &stages::ha1::Ha1,
        Stage::Ha2 => &stages::ha2::Ha2,
        Stage::Ha3 => &stages::ha3::Ha3,
        Stage::Aftercare3Mo => &stages::aftercare::Aftercare3Mo,
    }
}

/// Required items of `stage` not yet done in `checklist`, in template order.
pub fn missing_required(
    stage: Stage,
    checklist: &BTreeMap<String, ChecklistEntry>,
) -> Vec<&'static ChecklistItem> {
    template(stage).missing_required(checklist)
}
