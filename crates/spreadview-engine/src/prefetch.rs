//! Background warming of neighbouring slots.

use tracing::{debug, warn};

use spreadview_core::{Direction, step};

use crate::cache::ImageCache;

/// The `radius` slots after `center` in `direction`, wrapping.
///
/// Slots are listed nearest first, without duplicates and without `center`
/// itself, so short sequences yield fewer than `radius` entries.
pub fn neighbor_window(center: usize, direction: Direction, radius: usize, total: usize) -> Vec<usize> {
    let mut window = Vec::with_capacity(radius);
    let mut cursor = center;
    for _ in 0..radius {
        let Some(next) = step(cursor, direction, total) else {
            break;
        };
        if next == center {
            break;
        }
        window.push(next);
        cursor = next;
    }
    window
}

/// Keeps the next few slots loaded ahead of the user.
#[derive(Debug, Clone)]
pub struct PrefetchScheduler {
    cache: ImageCache,
    radius: usize,
}

impl PrefetchScheduler {
    /// Create a scheduler warming `radius` slots ahead.
    pub fn new(cache: ImageCache, radius: usize) -> Self {
        Self { cache, radius }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Warm the configured number of slots ahead of `center`.
    ///
    /// See [`PrefetchScheduler::warm`].
    pub fn warm_neighbors(&self, center: usize, direction: Direction) -> Vec<usize> {
        self.warm(center, direction, self.radius)
    }

    /// Start loading up to `radius` slots ahead of `center` in `direction`.
    ///
    /// Slots that are loaded or already loading are skipped. Each remaining
    /// slot is fetched on its own task; nothing is awaited and failures are
    /// only logged. Returns the slots that were scheduled.
    pub fn warm(&self, center: usize, direction: Direction, radius: usize) -> Vec<usize> {
        let scheduled: Vec<usize> = neighbor_window(center, direction, radius, self.cache.total())
            .into_iter()
            .filter(|&slot| !self.cache.get(slot).is_loaded_or_loading())
            .collect();

        if scheduled.is_empty() {
            return scheduled;
        }
        debug!(center, %direction, ?scheduled, "warming neighbours");

        for &slot in &scheduled {
            let cache = self.cache.clone();
            tokio::spawn(async move {
                if let Err(err) = cache.ensure_loaded(slot).await {
                    warn!(slot, error = %err, "background load failed");
                }
            });
        }
        scheduled
    }
}
