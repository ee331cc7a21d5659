pub mod engine;
pub mod font;

pub use engine::{TextEngine, TextSize};
pub use font::{FontFamily, FontSlant, FontSpec};
