pub(crate) mod exec;
pub(crate) mod ops;
pub(crate) mod paint;
pub(crate) mod raster;
pub(crate) mod surface_pool;

pub use ops::{HAlign, VAlign};
pub use paint::GradientDirection;
