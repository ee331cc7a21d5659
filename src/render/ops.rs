use std::str::FromStr;

use kurbo::Shape;

use crate::canvas::{BlendMode, RenderHint};
use crate::color::ColorSpan;
use crate::foundation::core::{BezPath, ClipRect, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::CanvasError;
use crate::render::paint::GradientDirection;
use crate::text::font::FontSpec;

/// Curve flattening tolerance in pixels.
pub(crate) const TOLERANCE: f64 = 0.1;

/// Horizontal placement of text inside a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HAlign {
    /// Flush with the left edge.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush with the right edge.
    Right,
}

/// Vertical placement of text inside a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VAlign {
    /// Flush with the top edge.
    #[default]
    Top,
    /// Centered.
    Center,
    /// Flush with the bottom edge.
    Bottom,
}

impl HAlign {
    fn factor(self) -> f64 {
        match self {
            HAlign::Left => 0.0,
            HAlign::Center => 0.5,
            HAlign::Right => 1.0,
        }
    }
}

impl VAlign {
    fn factor(self) -> f64 {
        match self {
            VAlign::Top => 0.0,
            VAlign::Center => 0.5,
            VAlign::Bottom => 1.0,
        }
    }
}

impl FromStr for HAlign {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(CanvasError::validation(format!("unknown horizontal alignment '{s}'"))),
        }
    }
}

impl FromStr for VAlign {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "center" | "centre" | "middle" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            _ => Err(CanvasError::validation(format!("unknown vertical alignment '{s}'"))),
        }
    }
}

/// Where a text block goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TextAnchor {
    TopLeft(Point),
    Boxed {
        bounds: Rect,
        h: HAlign,
        v: VAlign,
    },
}

impl TextAnchor {
    /// Top-left corner of a `width x height` block.
    pub(crate) fn origin(self, width: f64, height: f64) -> Point {
        match self {
            TextAnchor::TopLeft(p) => p,
            TextAnchor::Boxed { bounds, h, v } => Point::new(
                bounds.x0 + (bounds.width() - width) * h.factor(),
                bounds.y0 + (bounds.height() - height) * v.factor(),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FillOp {
    pub(crate) path: BezPath,
    pub(crate) color: Rgba8,
    pub(crate) even_odd: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StrokeOp {
    pub(crate) path: BezPath,
    pub(crate) color: Rgba8,
    pub(crate) width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ImageOp {
    pub(crate) url: String,
    pub(crate) origin: Point,
    /// Destination size; `None` uses the source size.
    pub(crate) size: Option<Vec2>,
    /// Source rectangle in image pixels; `None` is the whole image.
    pub(crate) src: Option<Rect>,
    pub(crate) rotation: f64,
    /// Pivot relative to the destination top-left; `None` is the center.
    pub(crate) pivot: Option<Point>,
    pub(crate) alpha: f32,
    pub(crate) tint: Option<Rgba8>,
}

/// One recorded drawing or state operation on a widget.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawOp {
    Shape {
        fill: Option<FillOp>,
        stroke: Option<StrokeOp>,
    },
    Text {
        spans: Vec<ColorSpan>,
        font: FontSpec,
        anchor: TextAnchor,
        shadow: Option<(Vec2, Rgba8)>,
    },
    Image(ImageOp),
    Gradient {
        rect: Rect,
        from: Rgba8,
        to: Rgba8,
        direction: GradientDirection,
    },
    RadialGradient {
        center: Point,
        radius: f64,
        inner: Rgba8,
        outer: Rgba8,
    },
    Clear(Rgba8),
    SetPixel {
        x: i32,
        y: i32,
        color: Rgba8,
    },
    SetClip(Option<ClipRect>),
    SetBlend(BlendMode),
    SetHint(RenderHint, bool),
    Save,
    Restore,
}

impl DrawOp {
    /// Short name for logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            DrawOp::Shape { .. } => "shape",
            DrawOp::Text { .. } => "text",
            DrawOp::Image(_) => "image",
            DrawOp::Gradient { .. } => "gradient",
            DrawOp::RadialGradient { .. } => "radial-gradient",
            DrawOp::Clear(_) => "clear",
            DrawOp::SetPixel { .. } => "set-pixel",
            DrawOp::SetClip(_) => "set-clip",
            DrawOp::SetBlend(_) => "set-blend",
            DrawOp::SetHint(..) => "set-hint",
            DrawOp::Save => "save",
            DrawOp::Restore => "restore",
        }
    }
}

pub(crate) fn line_path(from: Point, to: Point) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(from);
    p.line_to(to);
    p
}

/// Closed polygon through `points`. Callers guarantee at least three points.
pub(crate) fn polygon_path(points: &[Point]) -> BezPath {
    let mut p = BezPath::new();
    let mut it = points.iter();
    if let Some(&first) = it.next() {
        p.move_to(first);
        for &pt in it {
            p.line_to(pt);
        }
        p.close_path();
    }
    p
}

pub(crate) fn ellipse_path(center: Point, rx: f64, ry: f64) -> BezPath {
    kurbo::Ellipse::new(center, (rx, ry), 0.0).to_path(TOLERANCE)
}

/// Open arc curve from `start` to `end` (radians, clockwise).
pub(crate) fn arc_path(center: Point, radius: f64, start: f64, end: f64) -> BezPath {
    let arc = kurbo::Arc::new(center, (radius, radius), start, end - start, 0.0);
    arc.to_path(TOLERANCE)
}

/// Pie sector: center, out along `start`, around the arc and back.
pub(crate) fn pie_path(center: Point, radius: f64, start: f64, end: f64) -> BezPath {
    let arc = kurbo::Arc::new(center, (radius, radius), start, end - start, 0.0);
    let mut p = BezPath::new();
    p.move_to(center);
    p.line_to(center + Vec2::new(radius * start.cos(), radius * start.sin()));
    for el in arc.append_iter(TOLERANCE) {
        p.push(el);
    }
    p.close_path();
    p
}
