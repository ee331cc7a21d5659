mod mud;
mod named;
mod palette;
mod parse;

pub use mud::{ColorSpan, colorize, strip_codes};
pub use palette::xterm256;
pub use parse::{parse_color, resolve_color};
