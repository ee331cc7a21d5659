use std::collections::HashMap;

use crate::canvas::surface::Surface;
use crate::foundation::core::CanvasSize;

/// Lookup boundary between the engine and whoever owns widget surfaces.
pub trait SurfaceRegistry {
    /// Surface registered under `id`.
    fn resolve(&self, id: &str) -> Option<&Surface>;
    /// Mutable surface registered under `id`.
    fn resolve_mut(&mut self, id: &str) -> Option<&mut Surface>;
}

/// In-memory registry used by tests, the CLI and headless embedders.
#[derive(Clone, Debug, Default)]
pub struct WidgetRegistry {
    surfaces: HashMap<String, Surface>,
}

impl WidgetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a transparent surface under `id`.
    pub fn create(&mut self, id: impl Into<String>, size: CanvasSize) {
        let id = id.into();
        tracing::debug!(widget = %id, width = size.width, height = size.height, "create widget");
        self.surfaces.insert(id, Surface::new(size));
    }

    /// Remove `id`. Returns `false` when it was not registered.
    pub fn destroy(&mut self, id: &str) -> bool {
        self.surfaces.remove(id).is_some()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.surfaces.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.surfaces.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl SurfaceRegistry for WidgetRegistry {
    fn resolve(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    fn resolve_mut(&mut self, id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }
}
