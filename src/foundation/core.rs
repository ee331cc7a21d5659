use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::math::mul_div255_u8;

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Straight (non-premultiplied) RGBA8 color as produced by the color parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 is opaque.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black, also the out-of-bounds pixel sentinel.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black, the fallback for unparsable colors.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// Build a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Alpha as a float in `[0, 1]`.
    pub fn alpha_f32(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Return the same color with alpha replaced.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Convert to premultiplied form.
    pub fn premultiply(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgba8Premul {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Premultiply straight channels.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let a16 = u16::from(a);
        Self {
            r: mul_div255_u8(u16::from(r), a16),
            g: mul_div255_u8(u16::from(g), a16),
            b: mul_div255_u8(u16::from(b), a16),
            a,
        }
    }

    /// Undo premultiplication. Fully transparent pixels become transparent black.
    pub fn to_straight(self) -> Rgba8 {
        if self.a == 0 {
            return Rgba8::TRANSPARENT;
        }
        let a = u32::from(self.a);
        let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
        Rgba8::new(un(self.r), un(self.g), un(self.b), self.a)
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build from `[r, g, b, a]`.
    pub fn from_array(px: [u8; 4]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
    }
}

/// Integer clip rectangle in widget-local pixels, covering `[x, x+width) x [y, y+height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ClipRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ClipRect {
    /// Build a clip rectangle.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the pixel at `(x, y)` lies inside.
    pub fn contains(self, x: i32, y: i32) -> bool {
        let (x0, y0, x1, y1) = self.edges();
        let (x, y) = (i64::from(x), i64::from(y));
        x >= x0 && x < x1 && y >= y0 && y < y1
    }

    fn edges(self) -> (i64, i64, i64, i64) {
        let x0 = i64::from(self.x);
        let y0 = i64::from(self.y);
        (x0, y0, x0 + i64::from(self.width), y0 + i64::from(self.height))
    }
}

/// Half-open pixel bounds `[x0, x1) x [y0, y1)` clamped to a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelBounds {
    pub(crate) x0: u32,
    pub(crate) y0: u32,
    pub(crate) x1: u32,
    pub(crate) y1: u32,
}

impl PixelBounds {
    pub(crate) fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    /// Pixels touched by `rect`, grown by one pixel for antialiased edges.
    pub(crate) fn covering(rect: Rect, width: u32, height: u32) -> Self {
        let clamp = |v: f64, max: u32| -> u32 {
            if !v.is_finite() {
                return if v > 0.0 { max } else { 0 };
            }
            v.clamp(0.0, f64::from(max)) as u32
        };
        Self {
            x0: clamp(rect.x0.floor() - 1.0, width),
            y0: clamp(rect.y0.floor() - 1.0, height),
            x1: clamp(rect.x1.ceil() + 1.0, width),
            y1: clamp(rect.y1.ceil() + 1.0, height),
        }
    }

    pub(crate) fn intersect_clip(self, clip: Option<ClipRect>) -> Self {
        let Some(clip) = clip else {
            return self;
        };
        let (cx0, cy0, cx1, cy1) = clip.edges();
        let lo = |a: u32, b: i64| -> u32 { i64::from(a).max(b).max(0) as u32 };
        let hi = |a: u32, b: i64| -> u32 { i64::from(a).min(b).max(0) as u32 };
        Self {
            x0: lo(self.x0, cx0),
            y0: lo(self.y0, cy0),
            x1: hi(self.x1, cx1),
            y1: hi(self.y1, cy1),
        }
    }

    pub(crate) fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Width/height pair of a widget surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Validate dimensions against what the rasterizer can address.
    pub fn new(width: u32, height: u32) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::validation("canvas size must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(CanvasError::validation(format!(
                "canvas size {width}x{height} exceeds {}x{}",
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
