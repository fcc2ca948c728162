//! Navigator state and notifications.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::intent::Direction;

/// Phase of the transition state machine.
///
/// Anything other than `Idle` means the navigator is busy and drops new
/// navigation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TransitionPhase {
    #[default]
    Idle,
    /// Waiting for the target image before animating.
    Loading { target: usize, direction: Direction },
    /// The target image is fading in above the current one.
    FadingIn { target: usize, direction: Direction },
    /// The outgoing image is sliding off-stage.
    SlidingOut { target: usize, direction: Direction },
}

impl TransitionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Target slot of the transition in flight.
    pub fn target(&self) -> Option<usize> {
        match *self {
            Self::Idle => None,
            Self::Loading { target, .. }
            | Self::FadingIn { target, .. }
            | Self::SlidingOut { target, .. } => Some(target),
        }
    }

    /// Direction of the transition in flight.
    pub fn direction(&self) -> Option<Direction> {
        match *self {
            Self::Idle => None,
            Self::Loading { direction, .. }
            | Self::FadingIn { direction, .. }
            | Self::SlidingOut { direction, .. } => Some(direction),
        }
    }
}

/// Notifications emitted by navigators and scrubbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigatorEvent {
    /// The current spread changed.
    PositionChanged { relative: usize, absolute: i64 },
    /// The loading indicator should be shown or hidden.
    LoadingIndicator { visible: bool },
    /// A blocking load failed; the previous spread stays on screen.
    LoadFailed {
        relative: usize,
        absolute: i64,
        message: String,
    },
    /// A spread was clicked in a scrubber.
    PageActivated { absolute: i64 },
    /// The zoom level of a slot changed.
    ZoomChanged { relative: usize, level: f32 },
}
