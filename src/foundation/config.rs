use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::cache::ImageCacheOpts;
use crate::foundation::error::{CanvasError, CanvasResult};

/// Engine configuration.
///
/// Every field has a default, so a JSON settings file only needs the keys it changes.
/// Environment variables are applied on top by [`CanvasSettings::with_env_overrides`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasSettings {
    /// Bounds for the shared image cache.
    pub image_cache: ImageCacheOpts,
    /// Directory that relative image paths are resolved against.
    pub asset_root: Option<PathBuf>,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
    /// Load installed system fonts at startup.
    pub system_fonts: bool,
    /// Font used when a descriptor cannot be parsed.
    pub default_font: String,
    /// Start a background load when a draw names a URL the cache has never seen.
    pub auto_preload: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            image_cache: ImageCacheOpts::default(),
            asset_root: None,
            font_dirs: Vec::new(),
            system_fonts: true,
            default_font: "14px sans-serif".to_string(),
            auto_preload: false,
        }
    }
}

impl CanvasSettings {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn from_json_path(path: &Path) -> CanvasResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            CanvasError::validation(format!("settings '{}': {e}", path.display()))
        })
    }

    /// Apply `MUDCANVAS_*` environment variables on top of `self`.
    ///
    /// Unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_parse::<usize>("MUDCANVAS_IMAGE_CACHE_CAPACITY") {
            self.image_cache.max_entries = n;
        }
        if let Some(n) = env_parse::<usize>("MUDCANVAS_IMAGE_CACHE_BYTES") {
            self.image_cache.max_bytes = n;
        }
        if let Some(dirs) = std::env::var_os("MUDCANVAS_FONT_DIRS") {
            self.font_dirs.extend(std::env::split_paths(&dirs));
        }
        if let Ok(v) = std::env::var("MUDCANVAS_SYSTEM_FONTS") {
            match v.trim() {
                "0" | "false" | "off" => self.system_fonts = false,
                "1" | "true" | "on" => self.system_fonts = true,
                _ => {}
            }
        }
        if let Some(root) = std::env::var_os("MUDCANVAS_ASSET_ROOT") {
            self.asset_root = Some(PathBuf::from(root));
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
