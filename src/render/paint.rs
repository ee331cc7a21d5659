use std::str::FromStr;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, Point, Rect, Rgba8, Rgba8Premul};
use crate::foundation::error::CanvasError;
use crate::foundation::math::{lerp_u8, mul_div255_u8};

/// Axis of a linear gradient across its rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientDirection {
    /// Left edge to right edge.
    #[default]
    Horizontal,
    /// Top edge to bottom edge.
    Vertical,
    /// Top-left corner to bottom-right corner.
    Diagonal,
}

impl FromStr for GradientDirection {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            "diagonal" => Ok(Self::Diagonal),
            _ => Err(CanvasError::validation(format!(
                "unknown gradient direction '{s}'"
            ))),
        }
    }
}

/// Image sampling parameters for one draw.
pub(crate) struct ImagePaint<'a> {
    pub(crate) image: &'a DecodedImage,
    /// Device pixel space to image pixel space.
    pub(crate) inverse: Affine,
    /// Source rectangle in image pixels; samples are clamped inside it.
    pub(crate) src: Rect,
    pub(crate) alpha: f32,
    pub(crate) tint: Option<Rgba8>,
    pub(crate) bilinear: bool,
}

/// Color source evaluated per covered pixel.
pub(crate) enum Paint<'a> {
    Solid(Rgba8Premul),
    Linear {
        rect: Rect,
        from: Rgba8,
        to: Rgba8,
        direction: GradientDirection,
    },
    Radial {
        center: Point,
        radius: f64,
        inner: Rgba8,
        outer: Rgba8,
    },
    Image(ImagePaint<'a>),
}

impl Paint<'_> {
    /// Premultiplied color at the center of pixel `(x, y)`.
    pub(crate) fn sample(&self, x: u32, y: u32) -> [u8; 4] {
        let px = f64::from(x) + 0.5;
        let py = f64::from(y) + 0.5;
        match self {
            Paint::Solid(c) => c.to_array(),
            Paint::Linear {
                rect,
                from,
                to,
                direction,
            } => {
                let (dx, dy) = (px - rect.x0, py - rect.y0);
                let (w, h) = (rect.width(), rect.height());
                let t = match direction {
                    GradientDirection::Horizontal => ratio(dx, w),
                    GradientDirection::Vertical => ratio(dy, h),
                    GradientDirection::Diagonal => ratio(dx * w + dy * h, w * w + h * h),
                };
                mix(*from, *to, t)
            }
            Paint::Radial {
                center,
                radius,
                inner,
                outer,
            } => {
                let d = Point::new(px, py).distance(*center);
                mix(*inner, *outer, ratio(d, *radius))
            }
            Paint::Image(img) => img.sample(px, py),
        }
    }
}

impl ImagePaint<'_> {
    fn sample(&self, px: f64, py: f64) -> [u8; 4] {
        let p = self.inverse * Point::new(px, py);
        let raw = if self.bilinear {
            self.bilinear_at(p.x - 0.5, p.y - 0.5)
        } else {
            let (x, y) = self.clamp_texel(p.x.floor(), p.y.floor());
            self.image.pixel(x, y)
        };
        self.apply_alpha_tint(raw)
    }

    fn clamp_texel(&self, x: f64, y: f64) -> (u32, u32) {
        let cx = x.clamp(self.src.x0, (self.src.x1 - 1.0).max(self.src.x0));
        let cy = y.clamp(self.src.y0, (self.src.y1 - 1.0).max(self.src.y0));
        (cx as u32, cy as u32)
    }

    fn bilinear_at(&self, x: f64, y: f64) -> [u8; 4] {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = (x - x0) as f32;
        let fy = (y - y0) as f32;
        let (ax, ay) = self.clamp_texel(x0, y0);
        let (bx, by) = self.clamp_texel(x0 + 1.0, y0 + 1.0);
        let p00 = self.image.pixel(ax, ay);
        let p10 = self.image.pixel(bx, ay);
        let p01 = self.image.pixel(ax, by);
        let p11 = self.image.pixel(bx, by);
        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = lerp_u8(p00[c], p10[c], fx);
            let bottom = lerp_u8(p01[c], p11[c], fx);
            out[c] = lerp_u8(top, bottom, fy);
        }
        out
    }

    fn apply_alpha_tint(&self, mut px: [u8; 4]) -> [u8; 4] {
        if let Some(t) = self.tint {
            let ta = u16::from(t.a);
            for (c, tc) in px.iter_mut().take(3).zip([t.r, t.g, t.b]) {
                *c = mul_div255_u8(u16::from(mul_div255_u8(u16::from(*c), u16::from(tc))), ta);
            }
            px[3] = mul_div255_u8(u16::from(px[3]), ta);
        }
        if self.alpha < 1.0 {
            let a = u16::from((self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8);
            for c in &mut px {
                *c = mul_div255_u8(u16::from(*c), a);
            }
        }
        px
    }
}

fn ratio(num: f64, den: f64) -> f32 {
    if den <= 0.0 || !den.is_finite() {
        return 0.0;
    }
    (num / den).clamp(0.0, 1.0) as f32
}

fn mix(a: Rgba8, b: Rgba8, t: f32) -> [u8; 4] {
    Rgba8::new(
        lerp_u8(a.r, b.r, t),
        lerp_u8(a.g, b.g, t),
        lerp_u8(a.b, b.b, t),
        lerp_u8(a.a, b.a, t),
    )
    .premultiply()
    .to_array()
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
