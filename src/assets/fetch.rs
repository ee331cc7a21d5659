use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{CanvasError, CanvasResult};

/// Byte source for image URLs.
///
/// Called from rayon workers, never from a draw call.
pub trait ImageFetcher: Send + Sync {
    /// Return the raw encoded bytes behind `url`.
    fn fetch(&self, url: &str) -> CanvasResult<Vec<u8>>;
}

/// Reads local paths and `file://` URLs, plus `http(s)://` with the `http` feature.
#[derive(Clone, Debug, Default)]
pub struct DefaultFetcher {
    root: Option<PathBuf>,
}

impl DefaultFetcher {
    /// Resolve relative paths against `root` when given.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn read_file(&self, path: &Path) -> CanvasResult<Vec<u8>> {
        let path = self.resolve_path(path);
        let bytes =
            std::fs::read(&path).with_context(|| format!("read image '{}'", path.display()))?;
        Ok(bytes)
    }
}

impl ImageFetcher for DefaultFetcher {
    fn fetch(&self, url: &str) -> CanvasResult<Vec<u8>> {
        match url::Url::parse(url) {
            // One-letter schemes are Windows drive letters, not URLs.
            Ok(parsed) if parsed.scheme().len() > 1 => match parsed.scheme() {
                "file" => {
                    let path = parsed
                        .to_file_path()
                        .map_err(|_| CanvasError::validation(format!("bad file url '{url}'")))?;
                    self.read_file(&path)
                }
                "http" | "https" => fetch_http(url),
                other => Err(CanvasError::validation(format!(
                    "unsupported url scheme '{other}' in '{url}'"
                ))),
            },
            _ => self.read_file(Path::new(url)),
        }
    }
}

#[cfg(feature = "http")]
fn fetch_http(url: &str) -> CanvasResult<Vec<u8>> {
    let resp = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("GET {url}"))?;
    let bytes = resp.bytes().with_context(|| format!("read body of {url}"))?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "http"))]
fn fetch_http(url: &str) -> CanvasResult<Vec<u8>> {
    Err(CanvasError::validation(format!(
        "'{url}' needs the `http` feature"
    )))
}
