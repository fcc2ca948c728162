//! Image cache slots and the handles they hold.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;

/// A decoded image resource.
///
/// Cloning is cheap: the URL is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    url: Arc<str>,
    natural_width: u32,
    natural_height: u32,
}

impl ImageHandle {
    /// Create a handle for an image that decoded at the given size.
    pub fn new(url: impl Into<Arc<str>>, natural_width: u32, natural_height: u32) -> Self {
        Self {
            url: url.into(),
            natural_width,
            natural_height,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Intrinsic width in pixels.
    pub fn natural_width(&self) -> u32 {
        self.natural_width
    }

    /// Intrinsic height in pixels.
    pub fn natural_height(&self) -> u32 {
        self.natural_height
    }
}

/// Lifecycle of a cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub enum SlotState {
    /// Never requested.
    #[default]
    Empty,
    /// A load is in flight.
    Loading,
    /// The handle is available.
    Loaded,
    /// The last load attempt failed; a later request retries.
    Failed,
}

/// Snapshot of one cache slot.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub state: SlotState,
    /// Present only when `state` is [`SlotState::Loaded`].
    pub handle: Option<ImageHandle>,
}

impl Slot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn loading() -> Self {
        Self {
            state: SlotState::Loading,
            handle: None,
        }
    }

    pub fn loaded(handle: ImageHandle) -> Self {
        Self {
            state: SlotState::Loaded,
            handle: Some(handle),
        }
    }

    pub fn failed() -> Self {
        Self {
            state: SlotState::Failed,
            handle: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state == SlotState::Loaded
    }

    /// Loaded or loading: nothing more to schedule.
    pub fn is_loaded_or_loading(&self) -> bool {
        matches!(self.state, SlotState::Loaded | SlotState::Loading)
    }
}
