use audiocare_core::models::ear::Ear;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Tympanogram classification (Jerger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TympType {
    A,
    As,
    Ad,
    B,
    C,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct TympResult {
    #[serde(rename = "type")]
    pub tymp_type: Option<TympType>,
    #[serde(rename = "peak_pressure_daPa")]
    pub peak_pressure_dapa: Option<f64>,
    pub compliance_ml: Option<f64>,
    pub ecv_ml: Option<f64>,
}

impl TympResult {
    /// The type suggested by the measured peak and compliance.
    pub fn suggested_type(&self) -> TympType {
        suggest_tymp_type(self.peak_pressure_dapa, self.compliance_ml)
    }
}

/// Suggest a tympanogram type from peak pressure (daPa) and static
/// compliance (ml).
///
/// Compliance is checked first: a flat trace (< 0.1 ml) is type B however
/// the peak reads.
pub fn suggest_tymp_type(peak_pressure_dapa: Option<f64>, compliance_ml: Option<f64>) -> TympType {
    let (Some(peak), Some(compliance)) = (peak_pressure_dapa, compliance_ml) else {
        return TympType::Unknown;
    };
    if compliance < 0.1 {
        TympType::B
    } else if compliance < 0.2 {
        TympType::As
    } else if compliance > 1.8 {
        TympType::Ad
    } else if peak < -100.0 {
        TympType::C
    } else {
        TympType::A
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Otoscopy {
    pub right: Option<String>,
    pub left: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Tympanometry {
    pub right: TympResult,
    pub left: TympResult,
    pub notes: Option<String>,
}

impl Tympanometry {
    pub fn ear(&self, ear: Ear) -> &TympResult {
        match ear {
            Ear::Right => &self.right,
            Ear::Left => &self.left,
        }
    }
}

/// Otoscopy findings and tympanometry for one visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct MiddleEar {
    pub performed: bool,
    pub otoscopy: Otoscopy,
    pub tympanometry: Tympanometry,
}
