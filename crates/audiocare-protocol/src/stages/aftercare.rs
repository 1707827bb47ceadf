use crate::StageTemplate;
use crate::checklist::{ChecklistItem, ItemStatus, NoteTag, Section};
use crate::stage::Stage;
use crate::sub_checklists::SubChecklistKind;

use super::{optional, required};

/// Recurring three-month aftercare visit.
pub struct Aftercare3Mo;

impl StageTemplate for Aftercare3Mo {
    fn stage(&self) -> Stage {
        Stage::Aftercare3Mo
    }

    fn items(&self) -> &[ChecklistItem] {
        static ITEMS: std::sync::LazyLock<Vec<ChecklistItem>> = std::sync::LazyLock::new(|| {
            vec![
                required(
                    "interim_history",
                    "Changes in difficulty, satisfaction and use since last visit",
                    Section::Intake,
                ),
                optional(
                    "red_flags",
                    "Pain, discharge or sudden change",
                    Section::Intake,
                )
                .tags(&[NoteTag::Referred, NoteTag::NotReferred]),
                required("otoscopy", "Otoscopy", Section::Ear).opens(SubChecklistKind::Otoscopy),
                required(
                    "deep_cleaning",
                    "Deep cleaning and consumables",
                    Section::DeviceCheck,
                )
                .opens(SubChecklistKind::DeepCleaning),
                required("listening_check", "Hearing aid listening check", Section::DeviceCheck)
                    .opens(SubChecklistKind::ListeningCheck),
                optional("eaa_quick_check", "Test box quick check", Section::DeviceCheck)
                    .opens(SubChecklistKind::Eaa),
                optional(
                    "datalogging_adj",
                    "Adjustment from datalogging",
                    Section::Adjustment,
                )
                .opens(SubChecklistKind::DataloggingAdjustment),
                optional(
                    "fine_tuning",
                    "Program / gain adjustment if needed",
                    Section::Adjustment,
                )
                .opens(SubChecklistKind::FineTuning),
                optional(
                    "tymp_needed",
                    "Tympanometry if needed",
                    Section::Audiometry,
                )
                .opens(SubChecklistKind::Tympanometry)
                .defaults_to(ItemStatus::NotApplicable),
                optional(
                    "retest_needed",
                    "Retest if hearing change suspected",
                    Section::Audiometry,
                )
                .defaults_to(ItemStatus::NotApplicable),
                required(
                    "education_refresh",
                    "Care, cleaning and replacement reminders",
                    Section::Education,
                )
                .opens(SubChecklistKind::EducationRefresh),
                required(
                    "schedule_next",
                    "Book next aftercare (+90 days)",
                    Section::Planning,
                ),
            ]
        });
        &ITEMS
    }
}
