use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::fetch::{DefaultFetcher, ImageFetcher};
use crate::foundation::error::{CanvasError, CanvasResult};

/// Bounds for [`ImageCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImageCacheOpts {
    /// Maximum number of settled (ready or failed) entries.
    pub max_entries: usize,
    /// Maximum decoded bytes across ready entries.
    pub max_bytes: usize,
}

impl Default for ImageCacheOpts {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Load state of one cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageState {
    /// A fetch is in flight.
    Loading,
    /// Decoded and drawable.
    Ready,
    /// The last attempt failed. A new preload retries.
    Failed,
}

/// Metadata reported when a load completes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ImageInfo {
    /// Cache key exactly as passed in.
    pub url: String,
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
}

type Waiter = oneshot::Sender<Result<ImageInfo, String>>;

enum Slot {
    Loading { generation: u64, waiters: Vec<Waiter> },
    Ready(Arc<DecodedImage>),
    Failed(String),
}

#[derive(Default)]
struct Inner {
    slots: HashMap<String, Slot>,
    // Settled keys only, ordered by last use stamp (oldest first).
    lru: BTreeMap<u64, String>,
    stamps: HashMap<String, u64>,
    clock: u64,
    bytes: usize,
    next_generation: u64,
}

impl Inner {
    fn touch(&mut self, url: &str) {
        self.clock += 1;
        let stamp = self.clock;
        let key = match self.stamps.get_mut(url) {
            Some(old) => {
                let prev = std::mem::replace(old, stamp);
                self.lru.remove(&prev).unwrap_or_else(|| url.to_owned())
            }
            None => {
                self.stamps.insert(url.to_owned(), stamp);
                url.to_owned()
            }
        };
        self.lru.insert(stamp, key);
    }

    fn remove(&mut self, url: &str) -> Option<Slot> {
        if let Some(stamp) = self.stamps.remove(url) {
            self.lru.remove(&stamp);
        }
        let slot = self.slots.remove(url)?;
        if let Slot::Ready(img) = &slot {
            self.bytes = self.bytes.saturating_sub(img.byte_len());
        }
        Some(slot)
    }

    fn settle(&mut self, url: &str, slot: Slot) {
        if let Slot::Ready(img) = &slot {
            self.bytes += img.byte_len();
        }
        if let Some(Slot::Ready(old)) = self.slots.insert(url.to_owned(), slot) {
            self.bytes = self.bytes.saturating_sub(old.byte_len());
        }
        self.touch(url);
    }

    fn evict_over(&mut self, opts: ImageCacheOpts) {
        // The most recent entry always survives, even when it alone exceeds `max_bytes`.
        while self.lru.len() > 1 && (self.lru.len() > opts.max_entries || self.bytes > opts.max_bytes)
        {
            let Some((_, old)) = self.lru.pop_first() else {
                break;
            };
            self.stamps.remove(&old);
            if let Some(Slot::Ready(img)) = self.slots.remove(&old) {
                self.bytes = self.bytes.saturating_sub(img.byte_len());
            }
            tracing::debug!(url = %old, "evicted image");
        }
    }
}

/// Shared, thread-safe image store keyed by exact URL strings.
///
/// Cloning is cheap and every clone sees the same entries.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<Mutex<Inner>>,
    fetcher: Arc<dyn ImageFetcher>,
    opts: ImageCacheOpts,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("opts", &self.opts)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(ImageCacheOpts::default())
    }
}

impl ImageCache {
    /// Cache backed by [`DefaultFetcher`] without an asset root.
    pub fn new(opts: ImageCacheOpts) -> Self {
        Self::with_fetcher(opts, Arc::new(DefaultFetcher::default()))
    }

    /// Cache backed by a custom byte source.
    pub fn with_fetcher(opts: ImageCacheOpts, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            fetcher,
            opts,
        }
    }

    /// Configured bounds.
    pub fn opts(&self) -> ImageCacheOpts {
        self.opts
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start (or join) a background load of `url`.
    ///
    /// Ready entries resolve immediately, loading entries share the in-flight fetch and
    /// failed entries are retried.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn preload(&self, url: &str) -> ImageLoad {
        let (tx, rx) = oneshot::channel();
        let generation = {
            let mut inner = self.lock();
            match inner.slots.get_mut(url) {
                Some(Slot::Ready(img)) => {
                    let info = info_for(url, img);
                    inner.touch(url);
                    return ImageLoad::done(url, Ok(info));
                }
                Some(Slot::Loading { waiters, .. }) => {
                    waiters.push(tx);
                    return ImageLoad::pending(url, rx);
                }
                Some(Slot::Failed(_)) | None => {}
            }
            inner.remove(url);
            let generation = inner.next_generation;
            inner.next_generation += 1;
            inner.slots.insert(
                url.to_owned(),
                Slot::Loading {
                    generation,
                    waiters: vec![tx],
                },
            );
            generation
        };

        let cache = self.clone();
        let key = url.to_owned();
        rayon::spawn(move || {
            let result = cache
                .fetcher
                .fetch(&key)
                .and_then(|bytes| decode_image(&bytes));
            cache.complete(&key, generation, result);
        });
        ImageLoad::pending(url, rx)
    }

    fn complete(&self, url: &str, generation: u64, result: CanvasResult<DecodedImage>) {
        let mut inner = self.lock();
        let waiters = match inner.slots.get_mut(url) {
            Some(Slot::Loading {
                generation: g,
                waiters,
            }) if *g == generation => std::mem::take(waiters),
            _ => {
                tracing::debug!(url, "discarding load result for a replaced entry");
                return;
            }
        };

        let outcome = match result {
            Ok(img) => {
                let img = Arc::new(img);
                let info = info_for(url, &img);
                tracing::debug!(url, width = info.width, height = info.height, "image ready");
                inner.settle(url, Slot::Ready(img));
                inner.evict_over(self.opts);
                Ok(info)
            }
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(url, reason = %reason, "image load failed");
                inner.settle(url, Slot::Failed(reason.clone()));
                inner.evict_over(self.opts);
                Err(reason)
            }
        };
        drop(inner);

        for w in waiters {
            let _ = w.send(outcome.clone());
        }
    }

    /// Decode `bytes` now and store them under `url`, replacing any previous entry.
    ///
    /// Callers waiting on an in-flight load of the same key receive this image.
    pub fn insert_bytes(&self, url: &str, bytes: &[u8]) -> CanvasResult<ImageInfo> {
        let img = decode_image(bytes).map_err(|e| CanvasError::image_load(url, format!("{e:#}")))?;
        let img = Arc::new(img);
        let info = info_for(url, &img);

        let mut inner = self.lock();
        let waiters = match inner.remove(url) {
            Some(Slot::Loading { waiters, .. }) => waiters,
            _ => Vec::new(),
        };
        inner.settle(url, Slot::Ready(img));
        inner.evict_over(self.opts);
        drop(inner);

        for w in waiters {
            let _ = w.send(Ok(info.clone()));
        }
        Ok(info)
    }

    /// Decoded image when `url` is ready. Anything else means "skip the draw".
    pub fn get_ready(&self, url: &str) -> Option<Arc<DecodedImage>> {
        let mut inner = self.lock();
        let img = match inner.slots.get(url) {
            Some(Slot::Ready(img)) => Arc::clone(img),
            _ => return None,
        };
        inner.touch(url);
        Some(img)
    }

    /// Current state of `url`, `None` when the cache has never seen it (or evicted it).
    pub fn state(&self, url: &str) -> Option<ImageState> {
        self.lock().slots.get(url).map(|slot| match slot {
            Slot::Loading { .. } => ImageState::Loading,
            Slot::Ready(_) => ImageState::Ready,
            Slot::Failed(_) => ImageState::Failed,
        })
    }

    /// Failure reason of the last attempt, if it failed.
    pub fn failure(&self, url: &str) -> Option<String> {
        match self.lock().slots.get(url) {
            Some(Slot::Failed(reason)) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Drop one entry. Pending loads of it resolve with an error.
    pub fn evict(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.slots.clear();
        inner.lru.clear();
        inner.stamps.clear();
        inner.bytes = 0;
    }

    /// Number of entries in any state.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// `true` when no entries are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded bytes held by ready entries.
    pub fn bytes(&self) -> usize {
        self.lock().bytes
    }
}

fn info_for(url: &str, img: &DecodedImage) -> ImageInfo {
    ImageInfo {
        url: url.to_owned(),
        width: img.width,
        height: img.height,
    }
}

enum LoadState {
    Done(Option<CanvasResult<ImageInfo>>),
    Pending(oneshot::Receiver<Result<ImageInfo, String>>),
}

/// Completion handle returned by [`ImageCache::preload`].
///
/// Await it from async code or call [`ImageLoad::wait`] to block. Dropping it does not
/// cancel the load.
#[must_use = "dropping an ImageLoad discards the load result, not the load"]
pub struct ImageLoad {
    url: String,
    state: LoadState,
}

impl std::fmt::Debug for ImageLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = matches!(self.state, LoadState::Pending(_));
        f.debug_struct("ImageLoad")
            .field("url", &self.url)
            .field("pending", &pending)
            .finish()
    }
}

impl ImageLoad {
    fn done(url: &str, result: CanvasResult<ImageInfo>) -> Self {
        Self {
            url: url.to_owned(),
            state: LoadState::Done(Some(result)),
        }
    }

    fn pending(url: &str, rx: oneshot::Receiver<Result<ImageInfo, String>>) -> Self {
        Self {
            url: url.to_owned(),
            state: LoadState::Pending(rx),
        }
    }

    /// URL this handle reports on.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Block the current thread until the load settles.
    pub fn wait(self) -> CanvasResult<ImageInfo> {
        pollster::block_on(self)
    }
}

impl Future for ImageLoad {
    type Output = CanvasResult<ImageInfo>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            LoadState::Done(result) => Poll::Ready(result.take().unwrap_or_else(|| {
                Err(CanvasError::image_load(&this.url, "polled after completion"))
            })),
            LoadState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(msg) => {
                    let result = match msg {
                        Ok(Ok(info)) => Ok(info),
                        Ok(Err(reason)) => Err(CanvasError::image_load(&this.url, reason)),
                        Err(oneshot::Canceled) => {
                            Err(CanvasError::image_load(&this.url, "load was evicted"))
                        }
                    };
                    this.state = LoadState::Done(None);
                    Poll::Ready(result)
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
