use std::collections::{BTreeMap, BTreeSet};

use audiocare_core::models::ear::{Ear, EarPair};
use audiocare_core::models::frequency::{Frequency, Modality};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::clinical;
use crate::error::ThresholdError;

/// Chart value drawn for a no-response slot (off the bottom of the audiogram).
pub const NR_CHART_SENTINEL: i32 = 120;

/// Valid dB HL entry range on standard audiometers.
pub const MIN_DB_HL: i32 = -10;
pub const MAX_DB_HL: i32 = 120;

/// Whether a threshold value falls inside the audiometer's entry range.
/// `None` (untested) is always valid.
pub fn validate_db_hl(value: Option<i32>) -> bool {
    value.is_none_or(|v| (MIN_DB_HL..=MAX_DB_HL).contains(&v))
}

/// Thresholds for one ear and one modality, keyed by frequency.
///
/// A missing key and an explicit `null` both mean "untested". Nulls are
/// dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ThresholdMap(pub BTreeMap<Frequency, Option<i32>>);

impl<'de> Deserialize<'de> for ThresholdMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<Frequency, Option<i32>>::deserialize(deserializer)?;
        Ok(Self(raw.into_iter().filter(|(_, v)| v.is_some()).collect()))
    }
}

impl ThresholdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, frequency: Frequency) -> Option<i32> {
        self.0.get(&frequency).copied().flatten()
    }

    /// Store a value. Clearing removes the key, so a cleared slot and an
    /// untested one serialize the same way.
    pub fn set(&mut self, frequency: Frequency, value: Option<i32>) {
        match value {
            Some(v) => {
                self.0.insert(frequency, Some(v));
            }
            None => {
                self.0.remove(&frequency);
            }
        }
    }

    /// Frequencies with a numeric threshold, ascending.
    pub fn present(&self) -> impl Iterator<Item = (Frequency, i32)> + '_ {
        self.0.iter().filter_map(|(f, v)| v.map(|v| (*f, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

impl FromIterator<(Frequency, i32)> for ThresholdMap {
    fn from_iter<I: IntoIterator<Item = (Frequency, i32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(f, v)| (f, Some(v))).collect())
    }
}

/// Frequencies flagged "no response" per modality and ear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct NoResponse {
    pub ac_right: BTreeSet<Frequency>,
    pub ac_left: BTreeSet<Frequency>,
    pub bc_right: BTreeSet<Frequency>,
    pub bc_left: BTreeSet<Frequency>,
    pub sf_right: BTreeSet<Frequency>,
    pub sf_left: BTreeSet<Frequency>,
}

impl NoResponse {
    pub fn set(&self, ear: Ear, modality: Modality) -> &BTreeSet<Frequency> {
        match (modality, ear) {
            (Modality::Ac, Ear::Right) => &self.ac_right,
            (Modality::Ac, Ear::Left) => &self.ac_left,
            (Modality::Bc, Ear::Right) => &self.bc_right,
            (Modality::Bc, Ear::Left) => &self.bc_left,
            (Modality::Sf, Ear::Right) => &self.sf_right,
            (Modality::Sf, Ear::Left) => &self.sf_left,
        }
    }

    fn set_mut(&mut self, ear: Ear, modality: Modality) -> &mut BTreeSet<Frequency> {
        match (modality, ear) {
            (Modality::Ac, Ear::Right) => &mut self.ac_right,
            (Modality::Ac, Ear::Left) => &mut self.ac_left,
            (Modality::Bc, Ear::Right) => &mut self.bc_right,
            (Modality::Bc, Ear::Left) => &mut self.bc_left,
            (Modality::Sf, Ear::Right) => &mut self.sf_right,
            (Modality::Sf, Ear::Left) => &mut self.sf_left,
        }
    }

    pub fn contains(&self, ear: Ear, modality: Modality, frequency: Frequency) -> bool {
        self.set(ear, modality).contains(&frequency)
    }

    pub fn is_empty(&self) -> bool {
        Ear::BOTH
            .iter()
            .all(|ear| Modality::ALL.iter().all(|m| self.set(*ear, *m).is_empty()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Transducer {
    Insert,
    Supra,
    FreeField,
}

/// What a single audiogram slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// The modality is not tested at this frequency.
    NotApplicable,
    /// Flagged no-response; any stored number is ignored.
    NoResponse,
    Untested,
    Threshold(i32),
}

/// Pure-tone averages kept alongside the thresholds.
///
/// Recomputed by every [`PureTone`] mutation; there is no setter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct DerivedPta {
    /// Air-conduction PTA-4, right ear.
    pub pta_right: Option<i32>,
    pub pta_left: Option<i32>,
    /// Sound-field PTA-4, right side.
    pub pta_sf_right: Option<i32>,
    pub pta_sf_left: Option<i32>,
    /// Air-conduction PTA-6 (disability formula).
    pub pta6_right: Option<i32>,
    pub pta6_left: Option<i32>,
}

impl DerivedPta {
    pub fn ac_pta4(&self, ear: Ear) -> Option<i32> {
        match ear {
            Ear::Right => self.pta_right,
            Ear::Left => self.pta_left,
        }
    }

    pub fn sf_pta4(&self, ear: Ear) -> Option<i32> {
        match ear {
            Ear::Right => self.pta_sf_right,
            Ear::Left => self.pta_sf_left,
        }
    }

    pub fn ac_pta6(&self, ear: Ear) -> Option<i32> {
        match ear {
            Ear::Right => self.pta6_right,
            Ear::Left => self.pta6_left,
        }
    }
}

/// The pure-tone audiogram for one visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct PureTone {
    pub performed: bool,
    pub test_date: Option<jiff::civil::Date>,
    pub transducer: Option<Transducer>,
    pub ac_dbhl: EarPair<ThresholdMap>,
    pub bc_dbhl: EarPair<ThresholdMap>,
    pub sf_dbhl: EarPair<ThresholdMap>,
    pub nr: NoResponse,
    pub masking_used: Option<bool>,
    pub notes: Option<String>,
    derived: DerivedPta,
}

impl PureTone {
    pub fn derived(&self) -> &DerivedPta {
        &self.derived
    }

    pub fn thresholds(&self, ear: Ear, modality: Modality) -> &ThresholdMap {
        match modality {
            Modality::Ac => self.ac_dbhl.get(ear),
            Modality::Bc => self.bc_dbhl.get(ear),
            Modality::Sf => self.sf_dbhl.get(ear),
        }
    }

    fn thresholds_mut(&mut self, ear: Ear, modality: Modality) -> &mut ThresholdMap {
        match modality {
            Modality::Ac => self.ac_dbhl.get_mut(ear),
            Modality::Bc => self.bc_dbhl.get_mut(ear),
            Modality::Sf => self.sf_dbhl.get_mut(ear),
        }
    }

    fn check_supported(modality: Modality, frequency: Frequency) -> Result<(), ThresholdError> {
        if modality.supports(frequency) {
            Ok(())
        } else {
            Err(ThresholdError::UnsupportedFrequency {
                modality,
                frequency,
            })
        }
    }

    /// Record a threshold. A numeric value clears any no-response flag on
    /// the same slot and marks the test performed.
    ///
    /// BC and SF writes outside 250–4000 Hz are rejected and change nothing.
    pub fn set_threshold(
        &mut self,
        ear: Ear,
        modality: Modality,
        frequency: Frequency,
        value: Option<i32>,
    ) -> Result<(), ThresholdError> {
        Self::check_supported(modality, frequency)?;

        self.thresholds_mut(ear, modality).set(frequency, value);
        if value.is_some() {
            self.nr.set_mut(ear, modality).remove(&frequency);
            self.performed = true;
        }
        self.rederive();
        Ok(())
    }

    /// Flip the no-response flag. The stored number, if any, is kept.
    pub fn toggle_nr(
        &mut self,
        ear: Ear,
        modality: Modality,
        frequency: Frequency,
    ) -> Result<(), ThresholdError> {
        Self::check_supported(modality, frequency)?;

        let set = self.nr.set_mut(ear, modality);
        if !set.remove(&frequency) {
            set.insert(frequency);
        }
        self.rederive();
        Ok(())
    }

    pub fn reading(&self, ear: Ear, modality: Modality, frequency: Frequency) -> Reading {
        if !modality.supports(frequency) {
            return Reading::NotApplicable;
        }
        if self.nr.contains(ear, modality, frequency) {
            return Reading::NoResponse;
        }
        match self.thresholds(ear, modality).get(frequency) {
            Some(v) => Reading::Threshold(v),
            None => Reading::Untested,
        }
    }

    /// Value plotted on the audiogram: the threshold, or the off-scale
    /// sentinel for no-response.
    pub fn chart_value(&self, ear: Ear, modality: Modality, frequency: Frequency) -> Option<i32> {
        match self.reading(ear, modality, frequency) {
            Reading::Threshold(v) => Some(v),
            Reading::NoResponse => Some(NR_CHART_SENTINEL),
            Reading::NotApplicable | Reading::Untested => None,
        }
    }

    /// Thresholds with no-response slots dropped: the input for every
    /// clinical calculation.
    pub fn effective(&self, ear: Ear, modality: Modality) -> ThresholdMap {
        let nr = self.nr.set(ear, modality);
        self.thresholds(ear, modality)
            .present()
            .filter(|(f, _)| modality.supports(*f) && !nr.contains(f))
            .collect()
    }

    /// Whether anything was entered: a threshold or a no-response flag.
    pub fn has_data(&self) -> bool {
        let any_threshold = Ear::BOTH.iter().any(|ear| {
            Modality::ALL
                .iter()
                .any(|m| !self.thresholds(*ear, *m).is_empty())
        });
        any_threshold || !self.nr.is_empty()
    }

    /// Recompute the stored averages from the current thresholds.
    ///
    /// Mutators call this themselves; it is public for records that arrive
    /// from storage with stale or missing averages.
    pub fn rederive(&mut self) {
        let ac = EarPair::new(
            self.effective(Ear::Right, Modality::Ac),
            self.effective(Ear::Left, Modality::Ac),
        );
        let sf = EarPair::new(
            self.effective(Ear::Right, Modality::Sf),
            self.effective(Ear::Left, Modality::Sf),
        );
        self.derived = DerivedPta {
            pta_right: clinical::pta4(&ac.right),
            pta_left: clinical::pta4(&ac.left),
            pta_sf_right: clinical::pta4(&sf.right),
            pta_sf_left: clinical::pta4(&sf.left),
            pta6_right: clinical::pta6(&ac.right),
            pta6_left: clinical::pta6(&ac.left),
        };
    }

    /// Copy of this audiogram for seeding a later visit: same data, not
    /// performed this visit.
    pub fn carried_over(&self) -> PureTone {
        let mut copy = self.clone();
        copy.performed = false;
        copy.rederive();
        copy
    }
}
