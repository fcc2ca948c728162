//! Core types for spreadview.
//!
//! This crate holds the pieces of the spread viewer that carry no runtime:
//! relative/absolute index arithmetic, navigator configuration, the error
//! taxonomy, and the value types (slots, intents, events) exchanged between
//! the input layer and the navigation engine.

mod config;
mod error;
mod event;
mod index;
mod intent;
mod slot;

pub use config::{NavigatorConfig, NavigatorConfigBuilder, image_url};
pub use error::{ConfigError, LoadError, NavigatorError};
pub use event::{NavigatorEvent, TransitionPhase};
pub use index::{IndexMapper, infer_direction, step, wrap};
pub use intent::{ClickZones, Direction, NavigationIntent};
pub use slot::{ImageHandle, Slot, SlotState};
