//! Input mapping for spreadview.
//!
//! Turns raw pointer positions, key presses and wheel deltas into
//! [`NavigationIntent`]s and zoom requests. Nothing here touches navigator
//! state: the engine decides what an intent actually does.
//!
//! Two pointer modes exist:
//!
//! - **Click to flip** ([`InputAdapter::on_click`]): the display is split in
//!   halves and each half steps in a configured direction.
//! - **Continuous scrub** ([`spread_at`]): a single strip image shows every
//!   spread side by side and the pointer position selects one directly.

mod adapter;
mod scrub;

pub use adapter::{InputAdapter, KeyOutcome, WheelInput};
pub use scrub::{spread_at, tooltip_left};

pub use spreadview_core::{ClickZones, Direction, NavigationIntent};
