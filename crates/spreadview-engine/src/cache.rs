//! Per-slot image cache with in-flight deduplication.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::Shared;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use spreadview_core::{ImageHandle, IndexMapper, LoadError, NavigatorConfig, Slot, image_url};

use crate::loader::{BoxFuture, ResourceLoader};

type LoadResult = Result<ImageHandle, LoadError>;
type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

enum SlotEntry {
    Loading(PendingLoad),
    Loaded(ImageHandle),
    Failed,
}

struct CacheInner {
    base_path: String,
    extension: String,
    mapper: IndexMapper,
    loader: Arc<dyn ResourceLoader>,
    slots: DashMap<usize, SlotEntry>,
}

impl CacheInner {
    fn url_for(&self, relative: usize) -> String {
        image_url(&self.base_path, self.mapper.to_absolute(relative), &self.extension)
    }
}

/// One image slot per relative index, populated lazily.
///
/// Cloning is cheap and clones share the same slots. At most one fetch is
/// in flight per slot: concurrent callers of [`ImageCache::ensure_loaded`]
/// for a loading slot all await the same fetch.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<CacheInner>,
}

impl ImageCache {
    /// Create an empty cache for the sequence described by `config`.
    pub fn new(config: &NavigatorConfig, loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                base_path: config.base_path.clone(),
                extension: config.extension.clone(),
                mapper: config.mapper(),
                loader,
                slots: DashMap::new(),
            }),
        }
    }

    /// Number of slots in the sequence.
    pub fn total(&self) -> usize {
        self.inner.mapper.total()
    }

    /// URL fetched for a relative slot.
    pub fn url_for(&self, relative: usize) -> String {
        self.inner.url_for(relative)
    }

    /// Snapshot of a slot. Unknown slots are empty.
    pub fn get(&self, relative: usize) -> Slot {
        match self.inner.slots.get(&relative).as_deref() {
            Some(SlotEntry::Loaded(handle)) => Slot::loaded(handle.clone()),
            Some(SlotEntry::Loading(_)) => Slot::loading(),
            Some(SlotEntry::Failed) => Slot::failed(),
            None => Slot::empty(),
        }
    }

    /// The loaded handle of a slot, if any.
    pub fn handle(&self, relative: usize) -> Option<ImageHandle> {
        self.get(relative).handle
    }

    pub fn is_loaded(&self, relative: usize) -> bool {
        matches!(self.inner.slots.get(&relative).as_deref(), Some(SlotEntry::Loaded(_)))
    }

    /// Whether a fetch for the slot is in flight.
    pub fn is_pending(&self, relative: usize) -> bool {
        matches!(self.inner.slots.get(&relative).as_deref(), Some(SlotEntry::Loading(_)))
    }

    /// Number of loaded slots.
    pub fn loaded_count(&self) -> usize {
        self.inner
            .slots
            .iter()
            .filter(|entry| matches!(entry.value(), SlotEntry::Loaded(_)))
            .count()
    }

    /// Make sure a slot is loaded, fetching it if needed.
    ///
    /// Loaded slots return immediately. Loading slots await the fetch already
    /// in flight. Empty or failed slots start a new fetch; a failure leaves
    /// the slot `Failed` and is returned to every waiter.
    ///
    /// The fetch runs on its own task, so dropping the returned future does
    /// not strand the slot in `Loading`. Must be polled within a Tokio
    /// runtime.
    pub async fn ensure_loaded(&self, relative: usize) -> LoadResult {
        if !self.inner.mapper.contains(relative) {
            return Err(LoadError::OutOfRange {
                relative,
                total: self.total(),
            });
        }

        let (pending, launch) = match self.inner.slots.entry(relative) {
            Entry::Occupied(mut occupied) => match occupied.get() {
                SlotEntry::Loaded(handle) => return Ok(handle.clone()),
                SlotEntry::Loading(pending) => (pending.clone(), None),
                SlotEntry::Failed => {
                    let (pending, tx) = self.pending_load(relative);
                    occupied.insert(SlotEntry::Loading(pending.clone()));
                    (pending, Some(tx))
                }
            },
            Entry::Vacant(vacant) => {
                let (pending, tx) = self.pending_load(relative);
                vacant.insert(SlotEntry::Loading(pending.clone()));
                (pending, Some(tx))
            }
        };

        // The map guard is released before the fetch is spawned.
        if let Some(tx) = launch {
            self.spawn_fetch(relative, tx);
        }

        pending.await
    }

    fn pending_load(&self, relative: usize) -> (PendingLoad, oneshot::Sender<LoadResult>) {
        let (tx, rx) = oneshot::channel();
        let url = self.inner.url_for(relative);
        let pending = rx
            .map(move |received| received.unwrap_or(Err(LoadError::Aborted { url })))
            .boxed()
            .shared();
        (pending, tx)
    }

    fn spawn_fetch(&self, relative: usize, tx: oneshot::Sender<LoadResult>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let url = inner.url_for(relative);
            debug!(relative, %url, "fetching image");

            let result = inner.loader.load(&url).await;
            match &result {
                Ok(handle) => {
                    inner.slots.insert(relative, SlotEntry::Loaded(handle.clone()));
                }
                Err(err) => {
                    warn!(relative, %url, error = %err, "image fetch failed");
                    inner.slots.insert(relative, SlotEntry::Failed);
                }
            }
            // Every waiter holds the shared receiver; nobody listening is fine.
            let _ = tx.send(result);
        });
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("base_path", &self.inner.base_path)
            .field("total", &self.total())
            .field("loaded", &self.loaded_count())
            .finish()
    }
}
