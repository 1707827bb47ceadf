use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Ear {
    Right,
    Left,
}

impl Ear {
    pub const BOTH: [Ear; 2] = [Ear::Right, Ear::Left];

    pub fn other(self) -> Ear {
        match self {
            Ear::Right => Ear::Left,
            Ear::Left => Ear::Right,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Ear::Right => "right",
            Ear::Left => "left",
        }
    }
}

/// One value per ear, serialized as `{ "right": .., "left": .. }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct EarPair<T> {
    pub right: T,
    pub left: T,
}

impl<T> EarPair<T> {
    pub fn new(right: T, left: T) -> Self {
        Self { right, left }
    }

    pub fn get(&self, ear: Ear) -> &T {
        match ear {
            Ear::Right => &self.right,
            Ear::Left => &self.left,
        }
    }

    pub fn get_mut(&mut self, ear: Ear) -> &mut T {
        match ear {
            Ear::Right => &mut self.right,
            Ear::Left => &mut self.left,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Ear, &T) -> U) -> EarPair<U> {
        EarPair {
            right: f(Ear::Right, &self.right),
            left: f(Ear::Left, &self.left),
        }
    }
}
