//! Navigation, prefetch and transition engine for spreadview.
//!
//! # Overview
//!
//! A [`Navigator`] shows one spread of a page sequence at a time and moves
//! between spreads with a two-phase transition played by an external
//! [`Animator`]: the incoming image fades in above the current one, then the
//! outgoing image slides off-stage. Page images are fetched through a
//! [`ResourceLoader`] into an [`ImageCache`] that never issues two fetches for
//! the same slot at once, and a [`PrefetchScheduler`] keeps the next few
//! pages warm in the direction of travel.
//!
//! Navigation requests that arrive while a transition is running are dropped,
//! not queued.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use spreadview_engine::{FsLoader, Navigator, NavigatorConfig, SleepAnimator};
//!
//! # async fn run() {
//! let config = NavigatorConfig::new("pages/K3519", 77);
//! let navigator = Navigator::new(config, Arc::new(FsLoader::new()), Arc::new(SleepAnimator::new()));
//!
//! let mut events = navigator.subscribe();
//! navigator.mount().await.ok();
//! navigator.next().await;
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{event:?}");
//! }
//! # }
//! ```

mod animator;
mod cache;
mod loader;
mod navigator;
mod prefetch;
mod scrubber;
mod zoom;

pub use animator::{
    Animator, Easing, ImageStyle, InstantAnimator, Layer, SleepAnimator, TransformOrigin,
    TransitionStyle, Tween,
};
pub use cache::ImageCache;
pub use loader::{BoxFuture, FsLoader, ResourceLoader};
pub use navigator::{DropReason, NavigationOutcome, Navigator, Transition};
pub use prefetch::{PrefetchScheduler, neighbor_window};
pub use scrubber::Scrubber;
pub use zoom::{Viewport, ZoomLevels, max_zoom};

// Re-export core types for convenience
pub use spreadview_core::{
    ClickZones, Direction, ImageHandle, IndexMapper, LoadError, NavigationIntent,
    NavigatorConfig, NavigatorError, NavigatorEvent, Slot, SlotState, TransitionPhase,
};
pub use spreadview_input::WheelInput;

/// Capacity of the navigator event broadcast channel.
pub const EVENT_CHANNEL_SIZE: usize = 64;
