use std::str::FromStr;

use crate::canvas::blend::BlendMode;
use crate::foundation::core::ClipRect;
use crate::foundation::error::CanvasError;

/// Render hint toggled with `set_render_hint`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderHint {
    /// Anti-aliased shape and text edges.
    Antialiasing,
    /// Bilinear image sampling.
    Smoothing,
    /// Nearest-neighbour image sampling.
    Pixelated,
}

impl FromStr for RenderHint {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "antialiasing" | "antialias" => Ok(Self::Antialiasing),
            "smoothing" | "smooth" => Ok(Self::Smoothing),
            "pixelated" => Ok(Self::Pixelated),
            _ => Err(CanvasError::validation(format!("unknown render hint '{s}'"))),
        }
    }
}

/// Current hint flags. `smoothing` and `pixelated` are never both set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RenderHints {
    /// Edge anti-aliasing.
    pub antialiasing: bool,
    /// Bilinear image sampling.
    pub smoothing: bool,
    /// Nearest-neighbour image sampling.
    pub pixelated: bool,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            antialiasing: true,
            smoothing: true,
            pixelated: false,
        }
    }
}

impl RenderHints {
    /// Toggle one hint, keeping `smoothing` and `pixelated` exclusive.
    pub fn set(&mut self, hint: RenderHint, enabled: bool) {
        match hint {
            RenderHint::Antialiasing => self.antialiasing = enabled,
            RenderHint::Smoothing => {
                self.smoothing = enabled;
                if enabled {
                    self.pixelated = false;
                }
            }
            RenderHint::Pixelated => {
                self.pixelated = enabled;
                if enabled {
                    self.smoothing = false;
                }
            }
        }
    }

    /// `true` when images use bilinear sampling.
    pub fn bilinear(self) -> bool {
        self.smoothing && !self.pixelated
    }
}

/// Per-widget drawing state captured by `save_canvas`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CanvasState {
    /// Active clip, `None` means the whole surface.
    pub clip: Option<ClipRect>,
    /// Active blend mode.
    pub blend: BlendMode,
    /// Active render hints.
    pub hints: RenderHints,
}

/// Current state plus the save stack.
#[derive(Clone, Debug, Default)]
pub struct StateStack {
    current: CanvasState,
    saved: Vec<CanvasState>,
}

impl StateStack {
    /// State used by draws right now.
    pub fn current(&self) -> &CanvasState {
        &self.current
    }

    /// Mutable access to the current state.
    pub fn current_mut(&mut self) -> &mut CanvasState {
        &mut self.current
    }

    /// Push a copy of the current state.
    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Pop the last saved state into `current`. Returns `false` on an empty stack.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    /// Number of saved states.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}
