pub mod blend;
pub mod registry;
pub mod state;
pub mod surface;

pub use blend::BlendMode;
pub use registry::{SurfaceRegistry, WidgetRegistry};
pub use state::{CanvasState, RenderHint, RenderHints, StateStack};
pub use surface::Surface;
