use std::fmt;
use std::str::FromStr;

use audiocare_core::error::CoreError;
use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Visit stage in the hearing-aid fitting protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Stage {
    /// Assessment and device planning.
    #[serde(rename = "HA_1")]
    Ha1,
    /// First fitting and verification.
    #[serde(rename = "HA_2")]
    Ha2,
    /// Follow-up fine tuning and outcome validation.
    #[serde(rename = "HA_3")]
    Ha3,
    /// Recurring three-month aftercare.
    #[serde(rename = "AFTERCARE_3MO")]
    Aftercare3Mo,
}

/// How far out the next appointment is booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NextVisitRule {
    Weekly,
    ThreeMonth,
}

impl NextVisitRule {
    pub fn days(self) -> i64 {
        match self {
            NextVisitRule::Weekly => 7,
            NextVisitRule::ThreeMonth => 90,
        }
    }
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Ha1, Stage::Ha2, Stage::Ha3, Stage::Aftercare3Mo];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ha1 => "HA_1",
            Stage::Ha2 => "HA_2",
            Stage::Ha3 => "HA_3",
            Stage::Aftercare3Mo => "AFTERCARE_3MO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Ha1 => "1st visit: assessment",
            Stage::Ha2 => "2nd visit: fitting",
            Stage::Ha3 => "3rd visit: follow-up",
            Stage::Aftercare3Mo => "3-month aftercare",
        }
    }

    /// The stage booked after this one. Aftercare repeats.
    pub fn next(self) -> Stage {
        match self {
            Stage::Ha1 => Stage::Ha2,
            Stage::Ha2 => Stage::Ha3,
            Stage::Ha3 | Stage::Aftercare3Mo => Stage::Aftercare3Mo,
        }
    }

    pub fn next_visit_rule(self) -> NextVisitRule {
        match self {
            Stage::Ha1 | Stage::Ha2 => NextVisitRule::Weekly,
            Stage::Ha3 | Stage::Aftercare3Mo => NextVisitRule::ThreeMonth,
        }
    }

    /// Suggested date for the next appointment after a visit on `visit_date`.
    pub fn recommended_next_visit(self, visit_date: Date) -> Date {
        visit_date.saturating_add(self.next_visit_rule().days().days())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownStage(s.to_string()))
    }
}
