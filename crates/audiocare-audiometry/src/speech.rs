use audiocare_core::models::ear::Ear;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Where a speech test was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SpeechCondition {
    Right,
    Left,
    /// Loudspeaker, both ears open.
    FreeField,
    FreeFieldRight,
    FreeFieldLeft,
}

impl SpeechCondition {
    pub const ALL: [SpeechCondition; 5] = [
        SpeechCondition::Right,
        SpeechCondition::Left,
        SpeechCondition::FreeField,
        SpeechCondition::FreeFieldRight,
        SpeechCondition::FreeFieldLeft,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SpeechCondition::Right => "right",
            SpeechCondition::Left => "left",
            SpeechCondition::FreeField => "free_field",
            SpeechCondition::FreeFieldRight => "free_field_right",
            SpeechCondition::FreeFieldLeft => "free_field_left",
        }
    }
}

impl From<Ear> for SpeechCondition {
    fn from(ear: Ear) -> Self {
        match ear {
            Ear::Right => SpeechCondition::Right,
            Ear::Left => SpeechCondition::Left,
        }
    }
}

/// One value per speech test condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct PerCondition<T> {
    pub right: T,
    pub left: T,
    pub free_field: T,
    pub free_field_right: T,
    pub free_field_left: T,
}

impl<T> PerCondition<T> {
    pub fn get(&self, condition: SpeechCondition) -> &T {
        match condition {
            SpeechCondition::Right => &self.right,
            SpeechCondition::Left => &self.left,
            SpeechCondition::FreeField => &self.free_field,
            SpeechCondition::FreeFieldRight => &self.free_field_right,
            SpeechCondition::FreeFieldLeft => &self.free_field_left,
        }
    }

    pub fn get_mut(&mut self, condition: SpeechCondition) -> &mut T {
        match condition {
            SpeechCondition::Right => &mut self.right,
            SpeechCondition::Left => &mut self.left,
            SpeechCondition::FreeField => &mut self.free_field,
            SpeechCondition::FreeFieldRight => &mut self.free_field_right,
            SpeechCondition::FreeFieldLeft => &mut self.free_field_left,
        }
    }
}

/// Level-type speech metrics, all in dB HL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SpeechMetric {
    /// Speech recognition threshold.
    Srt,
    /// Most comfortable level.
    Mcl,
    /// Uncomfortable level.
    Ucl,
}

impl SpeechMetric {
    pub const ALL: [SpeechMetric; 3] = [SpeechMetric::Srt, SpeechMetric::Mcl, SpeechMetric::Ucl];

    pub fn label(self) -> &'static str {
        match self {
            SpeechMetric::Srt => "srt",
            SpeechMetric::Mcl => "mcl",
            SpeechMetric::Ucl => "ucl",
        }
    }
}

/// Word recognition score for one condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct WordRecognition {
    pub list_id: Option<String>,
    pub level_dbhl: Option<i32>,
    pub score_percent: Option<i32>,
}

impl WordRecognition {
    fn is_empty(&self) -> bool {
        self.list_id.is_none() && self.level_dbhl.is_none() && self.score_percent.is_none()
    }
}

/// A single field edit on a word recognition entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum WrsField {
    ListId(Option<String>),
    LevelDbhl(Option<i32>),
    ScorePercent(Option<i32>),
}

/// Speech audiometry results for one visit. Storage only: nothing here is
/// derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Speech {
    pub performed: bool,
    pub srt_dbhl: PerCondition<Option<i32>>,
    pub mcl_dbhl: PerCondition<Option<i32>>,
    pub ucl_dbhl: PerCondition<Option<i32>>,
    pub wrs: PerCondition<Option<WordRecognition>>,
    pub notes: Option<String>,
}

impl Speech {
    fn metric(&self, metric: SpeechMetric) -> &PerCondition<Option<i32>> {
        match metric {
            SpeechMetric::Srt => &self.srt_dbhl,
            SpeechMetric::Mcl => &self.mcl_dbhl,
            SpeechMetric::Ucl => &self.ucl_dbhl,
        }
    }

    fn metric_mut(&mut self, metric: SpeechMetric) -> &mut PerCondition<Option<i32>> {
        match metric {
            SpeechMetric::Srt => &mut self.srt_dbhl,
            SpeechMetric::Mcl => &mut self.mcl_dbhl,
            SpeechMetric::Ucl => &mut self.ucl_dbhl,
        }
    }

    pub fn value(&self, condition: SpeechCondition, metric: SpeechMetric) -> Option<i32> {
        *self.metric(metric).get(condition)
    }

    /// Set SRT, MCL or UCL. The first non-null write marks the test performed.
    pub fn set_value(&mut self, condition: SpeechCondition, metric: SpeechMetric, value: Option<i32>) {
        *self.metric_mut(metric).get_mut(condition) = value;
        if value.is_some() {
            self.performed = true;
        }
    }

    pub fn wrs(&self, condition: SpeechCondition) -> Option<&WordRecognition> {
        self.wrs.get(condition).as_ref()
    }

    pub fn wrs_score(&self, condition: SpeechCondition) -> Option<i32> {
        self.wrs(condition).and_then(|w| w.score_percent)
    }

    /// Edit one word recognition field; an entry left with nothing in it
    /// collapses back to `None`.
    pub fn set_wrs(&mut self, condition: SpeechCondition, field: WrsField) {
        let slot = self.wrs.get_mut(condition);
        let mut entry = slot.take().unwrap_or_default();
        let wrote_value = match field {
            WrsField::ListId(v) => {
                let some = v.is_some();
                entry.list_id = v;
                some
            }
            WrsField::LevelDbhl(v) => {
                entry.level_dbhl = v;
                v.is_some()
            }
            WrsField::ScorePercent(v) => {
                entry.score_percent = v;
                v.is_some()
            }
        };
        if !entry.is_empty() {
            *slot = Some(entry);
        }
        if wrote_value {
            self.performed = true;
        }
    }

    pub fn has_data(&self) -> bool {
        SpeechCondition::ALL.iter().any(|c| {
            SpeechMetric::ALL.iter().any(|m| self.value(*c, *m).is_some()) || self.wrs(*c).is_some()
        })
    }

    /// Copy for seeding a later visit: same values, not performed this visit.
    pub fn carried_over(&self) -> Speech {
        Speech {
            performed: false,
            ..self.clone()
        }
    }
}
