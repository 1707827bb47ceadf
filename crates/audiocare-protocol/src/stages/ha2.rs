use crate::StageTemplate;
use crate::checklist::{ChecklistItem, NoteTag, Section};
use crate::stage::Stage;
use crate::sub_checklists::SubChecklistKind;

use super::{optional, required};

/// HA-2: fitting, verification and core orientation.
pub struct Ha2;

impl StageTemplate for Ha2 {
    fn stage(&self) -> Stage {
        Stage::Ha2
    }

    fn items(&self) -> &[ChecklistItem] {
        static ITEMS: std::sync::LazyLock<Vec<ChecklistItem>> = std::sync::LazyLock::new(|| {
            vec![
                required("listening_check", "Hearing aid listening check", Section::DeviceCheck)
                    .opens(SubChecklistKind::ListeningCheck),
                optional("eaa_testbox", "Test box (EAA) quick check", Section::DeviceCheck)
                    .opens(SubChecklistKind::Eaa),
                required(
                    "physical_fit_check",
                    "Physical fit and feedback (dome/mold)",
                    Section::Fitting,
                )
                .opens(SubChecklistKind::FitComfort),
                required(
                    "programming_done",
                    "Programming (prescriptive target)",
                    Section::Fitting,
                )
                .opens(SubChecklistKind::Programming),
                required("rem_verification", "Real-ear measurement", Section::Fitting)
                    .opens(SubChecklistKind::Rem),
                required("mpo_safety_check", "Maximum output (MPO) safety", Section::Fitting)
                    .opens(SubChecklistKind::Mpo),
                required(
                    "sound_field_threshold",
                    "Sound-field aided thresholds",
                    Section::Audiometry,
                )
                .tags(&[NoteTag::Aided, NoteTag::Unaided]),
                optional(
                    "sound_field_speech",
                    "Sound-field speech (quiet / noise)",
                    Section::Audiometry,
                )
                .tags(&[NoteTag::Aided, NoteTag::Unaided]),
                optional("din_test", "Digits in noise", Section::Audiometry)
                    .tags(&[NoteTag::Aided, NoteTag::Unaided]),
                required(
                    "orientation_core",
                    "Insertion/removal, charging and care",
                    Section::Education,
                )
                .opens(SubChecklistKind::OrientationCore),
                required(
                    "adaptation_schedule",
                    "Adaptation schedule given",
                    Section::Education,
                )
                .opens(SubChecklistKind::AdaptationSchedule),
                optional(
                    "comm_strategies",
                    "Communication strategies for noise",
                    Section::Education,
                )
                .opens(SubChecklistKind::CommStrategies),
                required(
                    "schedule_next",
                    "Book 3rd visit (+7 days recommended)",
                    Section::Planning,
                ),
            ]
        });
        &ITEMS
    }
}
