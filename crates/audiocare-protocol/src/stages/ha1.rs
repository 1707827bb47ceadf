use crate::StageTemplate;
use crate::checklist::{ChecklistItem, NoteTag, Section};
use crate::stage::Stage;
use crate::sub_checklists::SubChecklistKind;

use super::{optional, required};

/// HA-1: first visit. History, audiological assessment and device plan.
pub struct Ha1;

impl StageTemplate for Ha1 {
    fn stage(&self) -> Stage {
        Stage::Ha1
    }

    fn items(&self) -> &[ChecklistItem] {
        static ITEMS: std::sync::LazyLock<Vec<ChecklistItem>> = std::sync::LazyLock::new(|| {
            vec![
                required(
                    "intake_review",
                    "Intake interview (difficult situations, goals, expectations)",
                    Section::Intake,
                ),
                optional(
                    "questionnaire_completed",
                    "Intake questionnaire completed",
                    Section::Intake,
                ),
                required("cosi_goals_set", "Top-3 goals set (COSI)", Section::Intake),
                required("otoscopy", "Otoscopy", Section::Ear).opens(SubChecklistKind::Otoscopy),
                optional("tympanometry", "Tympanometry", Section::Ear)
                    .opens(SubChecklistKind::Tympanometry),
                required(
                    "pure_tone_ac",
                    "Pure-tone audiometry (air conduction)",
                    Section::Audiometry,
                )
                .tags(&[NoteTag::Insert, NoteTag::Supra]),
                required(
                    "pure_tone_bc",
                    "Bone conduction (masked if needed)",
                    Section::Audiometry,
                )
                .tags(&[NoteTag::MaskingUsed, NoteTag::NoMasking]),
                required("speech_srt", "Speech recognition threshold", Section::Audiometry),
                required("speech_wrs", "Word recognition score", Section::Audiometry),
                optional(
                    "sin_baseline",
                    "Speech in noise baseline (if feasible)",
                    Section::Audiometry,
                ),
                optional(
                    "ucl_ldl",
                    "Uncomfortable loudness / output limit reference",
                    Section::Audiometry,
                ),
                required(
                    "device_plan",
                    "Device style, features and bilateral plan",
                    Section::Fitting,
                )
                .opens(SubChecklistKind::DevicePlan),
                required(
                    "expectation_counseling",
                    "Realistic expectations and adaptation period",
                    Section::Education,
                )
                .opens(SubChecklistKind::Expectation),
                required(
                    "schedule_next",
                    "Book 2nd visit (+7 days recommended)",
                    Section::Planning,
                ),
            ]
        });
        &ITEMS
    }
}
