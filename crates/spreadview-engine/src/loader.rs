//! Resource loading capability.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use spreadview_core::{ImageHandle, LoadError};

/// Type alias for boxed futures returned by capability traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches image resources by URL.
///
/// One call is one fetch attempt; the cache guarantees it never has two
/// attempts in flight for the same slot.
pub trait ResourceLoader: Send + Sync {
    /// Fetch and decode the image at `url`.
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ImageHandle, LoadError>>;
}

/// Loads page images from the local filesystem.
///
/// URLs are treated as file paths. A page counts as loaded only once it
/// decodes completely; a readable header over a truncated or corrupt body is
/// a decode error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl FsLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceLoader for FsLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ImageHandle, LoadError>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(url)
                .await
                .map_err(|err| LoadError::io(url, &err))?;

            // Decoding is CPU bound.
            let (width, height) = tokio::task::spawn_blocking(move || decode_dimensions(&bytes))
                .await
                .map_err(|_| LoadError::Aborted {
                    url: url.to_string(),
                })?
                .map_err(|message| LoadError::decode(url, message))?;

            debug!(%url, width, height, "image decoded");
            Ok(ImageHandle::new(url, width, height))
        })
    }
}

/// Fully decode an encoded image and return its natural size.
fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32), String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    Ok((image.width(), image.height()))
}
