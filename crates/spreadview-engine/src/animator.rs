//! Animation capability and the transition's tween presets.
//!
//! The engine never interpolates anything itself. It describes each phase of
//! a transition as a [`Tween`] and hands it to an [`Animator`], which owns
//! timing and rendering.

use std::time::Duration;

use strum::Display;
use tracing::debug;

use spreadview_core::{Direction, NavigatorConfig};

use crate::loader::BoxFuture;

/// Horizontal shift of the outgoing image, as a percentage of its width.
const SLIDE_SHIFT_PERCENT: f32 = 30.0;
/// Rotation of the outgoing image, in degrees.
const SLIDE_ROTATION_DEG: f32 = 30.0;
/// Final scale of the outgoing image.
const SLIDE_SCALE: f32 = 0.7;

/// Stacking layer of an image element, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Display)]
pub enum Layer {
    /// Hidden, behind everything.
    #[default]
    Base,
    /// The spread currently on screen.
    Active,
    /// The spread fading in.
    Incoming,
    /// The spread sliding away, above the incoming one.
    Outgoing,
}

/// Pivot point for scale and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum TransformOrigin {
    #[default]
    Center,
    LeftTop,
    RightTop,
}

/// Easing curve of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic ease-in: starts slow, accelerates.
    EaseIn,
}

impl Easing {
    /// Map linear progress in `[0, 1]` to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
        }
    }
}

/// Visual properties of one image element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStyle {
    pub opacity: f32,
    /// Horizontal translation in percent of the element width.
    pub translate_x: f32,
    pub scale: f32,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
    pub origin: TransformOrigin,
    pub layer: Layer,
}

impl ImageStyle {
    /// Identity transform, invisible, on the base layer.
    pub const fn hidden() -> Self {
        Self {
            opacity: 0.0,
            translate_x: 0.0,
            scale: 1.0,
            rotation: 0.0,
            origin: TransformOrigin::Center,
            layer: Layer::Base,
        }
    }

    /// Identity transform, fully visible, on the active layer.
    pub const fn active() -> Self {
        Self {
            opacity: 1.0,
            layer: Layer::Active,
            ..Self::hidden()
        }
    }

    pub const fn with_layer(self, layer: Layer) -> Self {
        Self { layer, ..self }
    }

    pub const fn with_opacity(self, opacity: f32) -> Self {
        Self { opacity, ..self }
    }

    /// Whether the transform is the identity.
    pub fn is_identity(&self) -> bool {
        self.translate_x == 0.0 && self.scale == 1.0 && self.rotation == 0.0
    }

    /// Interpolate towards `to` at eased progress `t`.
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        if t >= 1.0 {
            return *to;
        }
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self {
            opacity: mix(self.opacity, to.opacity),
            translate_x: mix(self.translate_x, to.translate_x),
            scale: mix(self.scale, to.scale),
            rotation: mix(self.rotation, to.rotation),
            origin: to.origin,
            layer: to.layer,
        }
    }
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self::hidden()
    }
}

/// One animated property change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub duration: Duration,
    pub easing: Easing,
    pub from: ImageStyle,
    pub to: ImageStyle,
}

impl Tween {
    /// Style at linear progress `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> ImageStyle {
        self.from.lerp(&self.to, self.easing.apply(t))
    }
}

/// Tween presets for the two transition phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStyle {
    pub fade_in: Duration,
    pub slide_out: Duration,
}

impl TransitionStyle {
    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self {
            fade_in: config.fade_in(),
            slide_out: config.slide_out(),
        }
    }

    /// Phase 1: the incoming image fades in above the current one.
    pub fn fade_in_tween(&self) -> Tween {
        let from = ImageStyle::hidden().with_layer(Layer::Incoming);
        Tween {
            duration: self.fade_in,
            easing: Easing::Linear,
            from,
            to: from.with_opacity(1.0),
        }
    }

    /// Phase 2: the outgoing image slides, turns and shrinks away.
    ///
    /// Going forward it leaves to the right pivoting on its right-top corner;
    /// going backward it mirrors that.
    pub fn slide_out_tween(&self, direction: Direction) -> Tween {
        let (shift, rotation, origin) = match direction {
            Direction::Forward => (SLIDE_SHIFT_PERCENT, -SLIDE_ROTATION_DEG, TransformOrigin::RightTop),
            Direction::Backward => (-SLIDE_SHIFT_PERCENT, SLIDE_ROTATION_DEG, TransformOrigin::LeftTop),
        };
        let from = ImageStyle {
            origin,
            ..ImageStyle::active().with_layer(Layer::Outgoing)
        };
        Tween {
            duration: self.slide_out,
            easing: Easing::EaseIn,
            from,
            to: ImageStyle {
                opacity: 0.0,
                translate_x: shift,
                scale: SLIDE_SCALE,
                rotation,
                ..from
            },
        }
    }
}

impl Default for TransitionStyle {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(200),
            slide_out: Duration::from_millis(400),
        }
    }
}

/// Plays tweens on image elements identified by slot index.
pub trait Animator: Send + Sync {
    /// Animate `target` through `tween`; resolves once, at the end state.
    fn animate(&self, target: usize, tween: Tween) -> BoxFuture<'_, ()>;

    /// Assign a style immediately, without animation.
    fn set(&self, target: usize, style: ImageStyle);
}

/// Animator that waits out each tween on the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepAnimator;

impl SleepAnimator {
    pub fn new() -> Self {
        Self
    }
}

impl Animator for SleepAnimator {
    fn animate(&self, target: usize, tween: Tween) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            debug!(
                slot = target,
                easing = %tween.easing,
                duration_ms = tween.duration.as_millis() as u64,
                "animating"
            );
            tokio::time::sleep(tween.duration).await;
        })
    }

    fn set(&self, target: usize, style: ImageStyle) {
        debug!(slot = target, opacity = style.opacity, layer = %style.layer, "style set");
    }
}

/// Animator that completes every tween immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantAnimator;

impl Animator for InstantAnimator {
    fn animate(&self, _target: usize, _tween: Tween) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }

    fn set(&self, _target: usize, _style: ImageStyle) {}
}
