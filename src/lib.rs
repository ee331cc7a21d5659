//! Immediate-mode 2D canvas engine for MUD client widgets.
//!
//! Widgets are pixel surfaces owned by the host UI and addressed by string ids.
//! [`DrawEngine`] draws shapes, MUD-colored text, cached images and gradients into them,
//! keeps a clip/blend/hint state stack per widget, and can defer calls into batches.
#![forbid(unsafe_code)]

pub mod assets;
pub mod canvas;
pub mod color;
pub mod engine;
pub mod foundation;
pub mod render;
pub mod script;
pub mod text;

pub use assets::{
    DecodedImage, DefaultFetcher, ImageCache, ImageCacheOpts, ImageFetcher, ImageInfo, ImageLoad,
    ImageState,
};
pub use canvas::{
    BlendMode, CanvasState, RenderHint, RenderHints, StateStack, Surface, SurfaceRegistry,
    WidgetRegistry,
};
pub use color::{ColorSpan, colorize, parse_color, resolve_color, strip_codes};
pub use engine::{BatchReport, DrawEngine, ShapeStyle};
pub use foundation::config::CanvasSettings;
pub use foundation::core::{Affine, BezPath, CanvasSize, ClipRect, Point, Rect, Rgba8, Vec2};
pub use foundation::error::{CanvasError, CanvasResult};
pub use render::{GradientDirection, HAlign, VAlign};
pub use script::{DrawCommand, DrawScript, ScriptReport, WidgetSpec, run_script};
pub use text::{FontFamily, FontSlant, FontSpec, TextEngine, TextSize};
