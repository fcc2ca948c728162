//! Wheel zoom levels.

use std::collections::HashMap;

use spreadview_core::ImageHandle;
use spreadview_input::WheelInput;

/// Levels this close to 1.0 are treated as unzoomed.
const ZOOM_SNAP: f32 = 1e-4;

/// Size of the display area the image is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Highest zoom level for an image in a viewport.
///
/// Native resolution relative to the viewport, but never less than `floor`.
pub fn max_zoom(natural_width: u32, natural_height: u32, viewport: Viewport, floor: f32) -> f32 {
    let ratio = |natural: u32, available: f32| {
        if available > 0.0 {
            natural as f32 / available
        } else {
            0.0
        }
    };
    ratio(natural_width, viewport.width)
        .max(ratio(natural_height, viewport.height))
        .max(floor)
}

/// Per-slot zoom levels, 1.0 unless changed.
#[derive(Debug, Clone)]
pub struct ZoomLevels {
    levels: HashMap<usize, f32>,
    step: f32,
    floor: f32,
}

impl ZoomLevels {
    /// Create levels changing by `step` per wheel event, with a maximum of at
    /// least `floor`.
    pub fn new(step: f32, floor: f32) -> Self {
        Self {
            levels: HashMap::new(),
            step,
            floor,
        }
    }

    /// Current level of a slot.
    pub fn level(&self, relative: usize) -> f32 {
        self.levels.get(&relative).copied().unwrap_or(1.0)
    }

    /// Return a slot to 1.0.
    pub fn reset(&mut self, relative: usize) {
        self.levels.remove(&relative);
    }

    /// Apply one wheel event to a slot showing `handle`.
    ///
    /// Returns the new level when it changed.
    pub fn apply(&mut self, relative: usize, wheel: WheelInput, handle: &ImageHandle, viewport: Viewport) -> Option<f32> {
        let max = max_zoom(handle.natural_width(), handle.natural_height(), viewport, self.floor);
        let current = self.level(relative);
        let mut next = (current + wheel.sign() * self.step).clamp(1.0, max);
        if (next - 1.0).abs() < ZOOM_SNAP {
            next = 1.0;
        }

        if (next - current).abs() < f32::EPSILON {
            return None;
        }
        if next == 1.0 {
            self.levels.remove(&relative);
        } else {
            self.levels.insert(relative, next);
        }
        Some(next)
    }
}
