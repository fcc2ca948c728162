//! Click, key and wheel mapping for the flip viewer.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use strum::Display;

use spreadview_core::{ClickZones, Direction, NavigationIntent};

/// Result of feeding a key press to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// Navigation to perform, if the key is bound.
    pub intent: Option<NavigationIntent>,
    /// The host should suppress the key's default action (page scroll).
    pub prevent_default: bool,
}

impl KeyOutcome {
    fn step(direction: Direction) -> Self {
        Self {
            intent: Some(NavigationIntent::Step(direction)),
            prevent_default: true,
        }
    }

    /// Whether the key was consumed.
    pub fn is_handled(&self) -> bool {
        self.intent.is_some()
    }
}

/// Zoom request derived from a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WheelInput {
    ZoomIn,
    ZoomOut,
}

impl WheelInput {
    /// Map a vertical wheel delta: scrolling up zooms in.
    pub fn from_delta(delta_y: f32) -> Option<Self> {
        if delta_y < 0.0 {
            Some(Self::ZoomIn)
        } else if delta_y > 0.0 {
            Some(Self::ZoomOut)
        } else {
            None
        }
    }

    /// Sign of the zoom change.
    pub fn sign(self) -> f32 {
        match self {
            Self::ZoomIn => 1.0,
            Self::ZoomOut => -1.0,
        }
    }
}

/// Maps raw input on the flip viewer to navigation intents.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputAdapter {
    zones: ClickZones,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter with a custom click zone mapping.
    pub fn with_zones(zones: ClickZones) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> ClickZones {
        self.zones
    }

    /// Map a click at `x` within a display area `width` wide.
    ///
    /// Clicks outside the area, or on an area with no width, yield nothing.
    pub fn on_click(&self, x: f32, width: f32) -> Option<NavigationIntent> {
        if !(width > 0.0) || !(0.0..width).contains(&x) {
            return None;
        }
        let direction = if x < width / 2.0 {
            self.zones.left
        } else {
            self.zones.right
        };
        Some(NavigationIntent::Step(direction))
    }

    /// Map a key press. Only the horizontal arrows are bound.
    pub fn on_key(&self, event: KeyEvent) -> KeyOutcome {
        if event.kind == KeyEventKind::Release {
            return KeyOutcome::default();
        }
        match event.code {
            KeyCode::Left => KeyOutcome::step(Direction::Backward),
            KeyCode::Right => KeyOutcome::step(Direction::Forward),
            _ => KeyOutcome::default(),
        }
    }

    /// Map a wheel event.
    pub fn on_wheel(&self, delta_y: f32) -> Option<WheelInput> {
        WheelInput::from_delta(delta_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key_event(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_click_halves_default() {
        let input = InputAdapter::new();
        assert_eq!(input.on_click(10.0, 800.0), Some(NavigationIntent::previous()));
        assert_eq!(input.on_click(399.9, 800.0), Some(NavigationIntent::previous()));
        assert_eq!(input.on_click(400.0, 800.0), Some(NavigationIntent::next()));
        assert_eq!(input.on_click(799.0, 800.0), Some(NavigationIntent::next()));
    }

    #[test]
    fn test_click_outside_area() {
        let input = InputAdapter::new();
        assert_eq!(input.on_click(-1.0, 800.0), None);
        assert_eq!(input.on_click(800.0, 800.0), None);
        assert_eq!(input.on_click(0.0, 0.0), None);
    }

    #[test]
    fn test_click_mirrored_zones() {
        let input = InputAdapter::with_zones(ClickZones::default().mirrored());
        assert_eq!(input.on_click(10.0, 800.0), Some(NavigationIntent::next()));
        assert_eq!(input.on_click(700.0, 800.0), Some(NavigationIntent::previous()));
    }

    #[test]
    fn test_arrow_keys_prevent_default() {
        let input = InputAdapter::new();

        let left = input.on_key(key_event(KeyCode::Left, KeyEventKind::Press));
        assert_eq!(left.intent, Some(NavigationIntent::previous()));
        assert!(left.prevent_default);

        let right = input.on_key(key_event(KeyCode::Right, KeyEventKind::Repeat));
        assert_eq!(right.intent, Some(NavigationIntent::next()));
        assert!(right.prevent_default);
    }

    #[test]
    fn test_other_keys_ignored() {
        let input = InputAdapter::new();

        let up = input.on_key(key_event(KeyCode::Up, KeyEventKind::Press));
        assert!(!up.is_handled());
        assert!(!up.prevent_default);

        let release = input.on_key(key_event(KeyCode::Right, KeyEventKind::Release));
        assert!(!release.is_handled());
    }

    #[test]
    fn test_wheel_direction() {
        let input = InputAdapter::new();
        assert_eq!(input.on_wheel(-120.0), Some(WheelInput::ZoomIn));
        assert_eq!(input.on_wheel(53.0), Some(WheelInput::ZoomOut));
        assert_eq!(input.on_wheel(0.0), None);
        assert_eq!(WheelInput::ZoomOut.sign(), -1.0);
    }
}
