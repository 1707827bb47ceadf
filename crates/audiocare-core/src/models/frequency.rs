use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// A pure-tone test frequency from the fixed clinical set.
///
/// Serialized as its Hz label (`"1000"`), so maps keyed by frequency keep the
/// `{ "500": 20, "1000": 25 }` shape of stored audiograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Frequency {
    #[serde(rename = "125")]
    Hz125,
    #[serde(rename = "250")]
    Hz250,
    #[serde(rename = "500")]
    Hz500,
    #[serde(rename = "750")]
    Hz750,
    #[serde(rename = "1000")]
    Hz1000,
    #[serde(rename = "1500")]
    Hz1500,
    #[serde(rename = "2000")]
    Hz2000,
    #[serde(rename = "3000")]
    Hz3000,
    #[serde(rename = "4000")]
    Hz4000,
    #[serde(rename = "6000")]
    Hz6000,
    #[serde(rename = "8000")]
    Hz8000,
}

impl Frequency {
    /// Every clinical frequency, ascending.
    pub const ALL: [Frequency; 11] = [
        Frequency::Hz125,
        Frequency::Hz250,
        Frequency::Hz500,
        Frequency::Hz750,
        Frequency::Hz1000,
        Frequency::Hz1500,
        Frequency::Hz2000,
        Frequency::Hz3000,
        Frequency::Hz4000,
        Frequency::Hz6000,
        Frequency::Hz8000,
    ];

    /// Frequencies tested by bone conduction and in the sound field.
    pub const MID: [Frequency; 8] = [
        Frequency::Hz250,
        Frequency::Hz500,
        Frequency::Hz750,
        Frequency::Hz1000,
        Frequency::Hz1500,
        Frequency::Hz2000,
        Frequency::Hz3000,
        Frequency::Hz4000,
    ];

    pub fn hz(self) -> u32 {
        match self {
            Frequency::Hz125 => 125,
            Frequency::Hz250 => 250,
            Frequency::Hz500 => 500,
            Frequency::Hz750 => 750,
            Frequency::Hz1000 => 1000,
            Frequency::Hz1500 => 1500,
            Frequency::Hz2000 => 2000,
            Frequency::Hz3000 => 3000,
            Frequency::Hz4000 => 4000,
            Frequency::Hz6000 => 6000,
            Frequency::Hz8000 => 8000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Hz125 => "125",
            Frequency::Hz250 => "250",
            Frequency::Hz500 => "500",
            Frequency::Hz750 => "750",
            Frequency::Hz1000 => "1000",
            Frequency::Hz1500 => "1500",
            Frequency::Hz2000 => "2000",
            Frequency::Hz3000 => "3000",
            Frequency::Hz4000 => "4000",
            Frequency::Hz6000 => "6000",
            Frequency::Hz8000 => "8000",
        }
    }

    pub fn from_hz(hz: u32) -> Option<Frequency> {
        Frequency::ALL.into_iter().find(|f| f.hz() == hz)
    }

    pub fn from_label(label: &str) -> Option<Frequency> {
        label.trim().parse::<u32>().ok().and_then(Frequency::from_hz)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::from_label(s).ok_or_else(|| CoreError::UnknownFrequency(s.to_string()))
    }
}

/// Pure-tone test modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Modality {
    /// Air conduction, headphones or inserts.
    Ac,
    /// Bone conduction, bone oscillator.
    Bc,
    /// Sound field, loudspeaker (usually aided).
    Sf,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Ac, Modality::Bc, Modality::Sf];

    pub fn supported_frequencies(self) -> &'static [Frequency] {
        match self {
            Modality::Ac => &Frequency::ALL,
            Modality::Bc | Modality::Sf => &Frequency::MID,
        }
    }

    pub fn supports(self, frequency: Frequency) -> bool {
        self.supported_frequencies().contains(&frequency)
    }

    pub fn label(self) -> &'static str {
        match self {
            Modality::Ac => "ac",
            Modality::Bc => "bc",
            Modality::Sf => "sf",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Modality::Ac => "AC",
            Modality::Bc => "BC",
            Modality::Sf => "SF",
        })
    }
}
