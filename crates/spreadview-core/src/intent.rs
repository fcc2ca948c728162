//! Navigation intents produced by the input layer.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Direction of travel through the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Towards higher page numbers.
    #[default]
    Forward,
    /// Towards lower page numbers.
    Backward,
}

impl Direction {
    /// Signed index offset of a single step.
    pub fn delta(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }

    /// The opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// A request to move the navigator, consumed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationIntent {
    /// Move one spread in the given direction.
    Step(Direction),
    /// Jump to an absolute page number (wrapped into range).
    Goto(i64),
}

impl NavigationIntent {
    pub fn next() -> Self {
        Self::Step(Direction::Forward)
    }

    pub fn previous() -> Self {
        Self::Step(Direction::Backward)
    }
}

/// Which direction each half of the display area navigates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickZones {
    /// Direction for clicks in the left half.
    #[serde(default = "default_left")]
    pub left: Direction,
    /// Direction for clicks in the right half.
    #[serde(default = "default_right")]
    pub right: Direction,
}

fn default_left() -> Direction {
    Direction::Backward
}

fn default_right() -> Direction {
    Direction::Forward
}

impl ClickZones {
    /// Swap the two halves (right-to-left reading order).
    pub fn mirrored(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }
}

impl Default for ClickZones {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
        }
    }
}
