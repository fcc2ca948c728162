//! Strip navigator: one image showing every spread side by side.
//!
//! Hovering selects a spread continuously; clicking activates it so the host
//! can open a full viewer on that page.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use spreadview_core::{ImageHandle, LoadError, NavigatorEvent};
use spreadview_input::spread_at;

use crate::EVENT_CHANNEL_SIZE;
use crate::loader::ResourceLoader;

#[derive(Debug, Default)]
struct ScrubState {
    total: usize,
    strip: Option<ImageHandle>,
    /// 1-based spread under the pointer.
    hovered: Option<usize>,
}

/// Pointer-driven navigator over a strip image.
pub struct Scrubber {
    first_index: i64,
    loader: Arc<dyn ResourceLoader>,
    state: Mutex<ScrubState>,
    events: broadcast::Sender<NavigatorEvent>,
}

impl Scrubber {
    /// Create a scrubber over `total` spreads numbered from `first_index`.
    pub fn new(total: usize, first_index: i64, loader: Arc<dyn ResourceLoader>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            first_index,
            loader,
            state: Mutex::new(ScrubState {
                total,
                ..ScrubState::default()
            }),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScrubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigatorEvent> {
        self.events.subscribe()
    }

    pub fn total(&self) -> usize {
        self.lock().total
    }

    /// Change the number of spreads on the strip.
    pub fn set_total(&self, total: usize) {
        let mut state = self.lock();
        state.total = total;
        state.hovered = state.hovered.filter(|&spread| spread <= total);
    }

    /// Whether the strip image is loaded; pointer input is ignored until it is.
    pub fn is_ready(&self) -> bool {
        self.lock().strip.is_some()
    }

    /// The 1-based spread last hovered.
    pub fn hovered(&self) -> Option<usize> {
        self.lock().hovered
    }

    /// Load the strip image. On failure the scrubber stays inert.
    pub async fn load_strip(&self, url: &str) -> Result<ImageHandle, LoadError> {
        self.lock().strip = None;
        match self.loader.load(url).await {
            Ok(handle) => {
                debug!(%url, width = handle.natural_width(), "strip image loaded");
                self.lock().strip = Some(handle.clone());
                Ok(handle)
            }
            Err(err) => {
                warn!(%url, error = %err, "strip image failed to load");
                Err(err)
            }
        }
    }

    fn absolute(&self, spread: usize) -> i64 {
        spread as i64 - 1 + self.first_index
    }

    /// Track the pointer at `x` on a strip `width` wide.
    ///
    /// Emits `PositionChanged` when the hovered spread changes. Returns the
    /// absolute page under the pointer.
    pub fn hover(&self, x: f32, width: f32) -> Option<i64> {
        let spread = {
            let mut state = self.lock();
            state.strip.as_ref()?;
            let spread = spread_at(x, width, state.total)?;
            if state.hovered == Some(spread) {
                return Some(self.absolute(spread));
            }
            state.hovered = Some(spread);
            spread
        };
        let absolute = self.absolute(spread);
        let _ = self.events.send(NavigatorEvent::PositionChanged {
            relative: spread - 1,
            absolute,
        });
        Some(absolute)
    }

    /// Activate the spread under a click at `x`.
    ///
    /// Emits `PageActivated` and returns the absolute page.
    pub fn click(&self, x: f32, width: f32) -> Option<i64> {
        let spread = {
            let state = self.lock();
            state.strip.as_ref()?;
            spread_at(x, width, state.total)?
        };
        let absolute = self.absolute(spread);
        let _ = self.events.send(NavigatorEvent::PageActivated { absolute });
        Some(absolute)
    }
}

impl std::fmt::Debug for Scrubber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scrubber")
            .field("first_index", &self.first_index)
            .field("state", &*self.lock())
            .finish()
    }
}
