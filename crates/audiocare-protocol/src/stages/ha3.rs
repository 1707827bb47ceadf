use crate::StageTemplate;
use crate::checklist::{ChecklistItem, Section};
use crate::stage::Stage;
use crate::sub_checklists::SubChecklistKind;

use super::{optional, required};

/// HA-3: follow-up fine tuning and outcome validation.
pub struct Ha3;

impl StageTemplate for Ha3 {
    fn stage(&self) -> Stage {
        Stage::Ha3
    }

    fn items(&self) -> &[ChecklistItem] {
        static ITEMS: std::sync::LazyLock<Vec<ChecklistItem>> = std::sync::LazyLock::new(|| {
            vec![
                required(
                    "experience_review",
                    "Review top-3 difficult situations",
                    Section::Intake,
                ),
                optional(
                    "datalogging_review",
                    "Datalogging (wear time / environments)",
                    Section::DeviceCheck,
                ),
                required(
                    "otoscopy_followup",
                    "Otoscopy recheck (irritation / inflammation)",
                    Section::Ear,
                )
                .opens(SubChecklistKind::Otoscopy),
                required(
                    "cleaning_consumables",
                    "Cleaning and consumables",
                    Section::DeviceCheck,
                )
                .opens(SubChecklistKind::DeepCleaning),
                required(
                    "fine_tuning",
                    "Gain / noise / feedback fine tuning",
                    Section::Adjustment,
                )
                .opens(SubChecklistKind::FineTuning),
                optional(
                    "rem_reverify",
                    "Repeat REM after major changes",
                    Section::Adjustment,
                )
                .opens(SubChecklistKind::Rem),
                required(
                    "validation_cosi",
                    "Top-3 goal improvement (COSI)",
                    Section::Outcome,
                ),
                required("satisfaction", "Satisfaction (0-10)", Section::Outcome),
                required(
                    "switch_to_aftercare",
                    "Move to 3-month aftercare (+90 days)",
                    Section::Planning,
                ),
            ]
        });
        &ITEMS
    }
}
