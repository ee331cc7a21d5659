use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use super::*;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Serves a fixed PNG for `ok*` keys and fails everything else. Counts fetches.
struct CountingFetcher {
    calls: AtomicUsize,
}

impl ImageFetcher for CountingFetcher {
    fn fetch(&self, url: &str) -> CanvasResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.starts_with("ok") {
            Ok(png_bytes(3, 2))
        } else {
            Err(CanvasError::validation(format!("no such image {url}")))
        }
    }
}

/// Blocks each fetch until the test releases it.
struct GatedFetcher {
    gate: Mutex<mpsc::Receiver<()>>,
}

impl ImageFetcher for GatedFetcher {
    fn fetch(&self, _url: &str) -> CanvasResult<Vec<u8>> {
        let _ = self.gate.lock().unwrap().recv();
        Ok(png_bytes(1, 1))
    }
}

fn counting_cache(opts: ImageCacheOpts) -> (ImageCache, Arc<CountingFetcher>) {
    let fetcher = Arc::new(CountingFetcher {
        calls: AtomicUsize::new(0),
    });
    (ImageCache::with_fetcher(opts, fetcher.clone()), fetcher)
}

#[test]
fn preload_resolves_with_dimensions_and_ready_is_memoized() {
    let (cache, fetcher) = counting_cache(ImageCacheOpts::default());
    let info = cache.preload("ok.png").wait().unwrap();
    assert_eq!((info.width, info.height), (3, 2));
    assert_eq!(info.url, "ok.png");
    assert_eq!(cache.state("ok.png"), Some(ImageState::Ready));
    assert!(cache.get_ready("ok.png").is_some());

    cache.preload("ok.png").wait().unwrap();
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn keys_are_exact_strings() {
    let (cache, fetcher) = counting_cache(ImageCacheOpts::default());
    cache.preload("ok.png").wait().unwrap();
    cache.preload("ok.png?").wait().unwrap();
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn failed_loads_report_and_retry() {
    let (cache, fetcher) = counting_cache(ImageCacheOpts::default());
    let err = cache.preload("missing.png").wait().unwrap_err();
    assert!(matches!(err, CanvasError::ImageLoad { ref url, .. } if url == "missing.png"));
    assert_eq!(cache.state("missing.png"), Some(ImageState::Failed));
    assert!(cache.failure("missing.png").is_some());
    assert!(cache.get_ready("missing.png").is_none());

    assert!(cache.preload("missing.png").wait().is_err());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_preloads_join_one_fetch() {
    let (tx, rx) = mpsc::channel();
    let cache = ImageCache::with_fetcher(
        ImageCacheOpts::default(),
        Arc::new(GatedFetcher {
            gate: Mutex::new(rx),
        }),
    );
    let a = cache.preload("slow.png");
    let b = cache.preload("slow.png");
    assert_eq!(cache.state("slow.png"), Some(ImageState::Loading));
    assert!(cache.get_ready("slow.png").is_none());

    tx.send(()).unwrap();
    assert_eq!(a.wait().unwrap().width, 1);
    assert_eq!(b.wait().unwrap().width, 1);
    assert_eq!(cache.state("slow.png"), Some(ImageState::Ready));
}

#[test]
fn insert_bytes_is_synchronous_and_validates() {
    let cache = ImageCache::default();
    let info = cache.insert_bytes("mem://x", &png_bytes(4, 4)).unwrap();
    assert_eq!((info.width, info.height), (4, 4));
    assert_eq!(cache.bytes(), 4 * 4 * 4);
    assert!(matches!(
        cache.insert_bytes("mem://bad", b"nope"),
        Err(CanvasError::ImageLoad { .. })
    ));
    assert_eq!(cache.state("mem://bad"), None);
}

#[test]
fn lru_evicts_least_recently_used_by_count() {
    let cache = ImageCache::new(ImageCacheOpts {
        max_entries: 2,
        max_bytes: usize::MAX,
    });
    cache.insert_bytes("a", &png_bytes(1, 1)).unwrap();
    cache.insert_bytes("b", &png_bytes(1, 1)).unwrap();
    assert!(cache.get_ready("a").is_some());
    cache.insert_bytes("c", &png_bytes(1, 1)).unwrap();

    assert!(cache.get_ready("a").is_some());
    assert_eq!(cache.state("b"), None);
    assert_eq!(cache.len(), 2);
}

#[test]
fn lru_evicts_by_bytes_but_keeps_newest() {
    let cache = ImageCache::new(ImageCacheOpts {
        max_entries: 100,
        max_bytes: 40,
    });
    cache.insert_bytes("small", &png_bytes(2, 2)).unwrap();
    cache.insert_bytes("big", &png_bytes(4, 4)).unwrap();
    assert_eq!(cache.state("small"), None);
    assert_eq!(cache.state("big"), Some(ImageState::Ready));
    assert_eq!(cache.bytes(), 64);
}

#[test]
fn evict_and_clear_drop_entries() {
    let cache = ImageCache::default();
    cache.insert_bytes("a", &png_bytes(1, 1)).unwrap();
    cache.insert_bytes("b", &png_bytes(1, 1)).unwrap();
    assert!(cache.evict("a"));
    assert!(!cache.evict("a"));
    assert_eq!(cache.len(), 1);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.bytes(), 0);
}

#[test]
fn clones_share_entries() {
    let cache = ImageCache::default();
    let other = cache.clone();
    cache.insert_bytes("shared", &png_bytes(1, 1)).unwrap();
    assert!(other.get_ready("shared").is_some());
}

#[test]
fn repeated_reads_keep_one_lru_entry_per_key() {
    let cache = ImageCache::new(ImageCacheOpts {
        max_entries: 3,
        max_bytes: usize::MAX,
    });
    for key in ["a", "b", "c"] {
        cache.insert_bytes(key, &png_bytes(1, 1)).unwrap();
    }
    for _ in 0..50 {
        assert!(cache.get_ready("a").is_some());
        assert!(cache.get_ready("b").is_some());
    }
    {
        let inner = cache.lock();
        assert_eq!(inner.lru.len(), 3);
        assert_eq!(inner.stamps.len(), 3);
        let order: Vec<&str> = inner.lru.values().map(String::as_str).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    cache.insert_bytes("d", &png_bytes(1, 1)).unwrap();
    assert_eq!(cache.state("c"), None);
    assert!(cache.evict("a"));
    let inner = cache.lock();
    assert_eq!(inner.lru.len(), 2);
    assert_eq!(inner.stamps.len(), 2);
}
