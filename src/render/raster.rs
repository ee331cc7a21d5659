use kurbo::Shape;

use crate::foundation::core::{Affine, BezPath, PixelBounds, Rect, Rgba8};
use crate::render::surface_pool::SurfacePool;
use crate::text::engine::ShapedText;

/// Geometry whose coverage is rasterized into a mask.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Coverage<'a> {
    /// Interior of a closed path.
    Fill { path: &'a BezPath, even_odd: bool },
    /// Outline of a path with a given line width.
    Stroke { path: &'a BezPath, width: f64 },
}

/// Rasterized pixels in a surface-sized scratch pixmap.
///
/// Only `bounds` may hold non-transparent pixels.
pub(crate) struct Layer {
    pub(crate) pixmap: vello_cpu::Pixmap,
    pub(crate) bounds: PixelBounds,
}

impl Layer {
    /// Premultiplied pixel at `(x, y)`.
    #[inline]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * usize::from(self.pixmap.width()) + (x as usize)) * 4;
        let d = self.pixmap.data_as_u8_slice();
        [d[idx], d[idx + 1], d[idx + 2], d[idx + 3]]
    }

    /// Alpha of the mask at `(x, y)`.
    #[inline]
    pub(crate) fn coverage(&self, x: u32, y: u32) -> u8 {
        let idx = ((y as usize) * usize::from(self.pixmap.width()) + (x as usize)) * 4 + 3;
        self.pixmap.data_as_u8_slice()[idx]
    }

    fn threshold(&mut self) {
        let w = usize::from(self.pixmap.width());
        let b = self.bounds;
        let data = self.pixmap.data_as_u8_slice_mut();
        for y in b.y0..b.y1 {
            let row = (y as usize) * w;
            for x in b.x0..b.x1 {
                let i = (row + x as usize) * 4;
                let px = &mut data[i..i + 4];
                let a = px[3];
                if a >= 128 {
                    // Unpremultiply to full opacity.
                    for c in px.iter_mut().take(3) {
                        *c = ((u32::from(*c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255)
                            as u8;
                    }
                    px[3] = 255;
                } else {
                    px.fill(0);
                }
            }
        }
    }
}

/// `vello_cpu` front end producing coverage masks and glyph layers.
#[derive(Default)]
pub(crate) struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    pool: SurfacePool,
}

impl Rasterizer {
    fn with_ctx<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }

    /// Coverage of `shape` under `transform` as a white mask.
    ///
    /// Returns `None` when the shape touches no pixel of a `width x height` surface.
    pub(crate) fn coverage(
        &mut self,
        width: u16,
        height: u16,
        shape: Coverage<'_>,
        transform: Affine,
        antialias: bool,
    ) -> Option<Layer> {
        let (path, grow) = match shape {
            Coverage::Fill { path, .. } => (path, 0.0),
            Coverage::Stroke { path, width } => (path, width * 0.5 + 1.0),
        };
        let bbox = transform_bbox(path.bounding_box(), transform).inflate(grow, grow);
        let bounds = PixelBounds::covering(bbox, u32::from(width), u32::from(height));
        if bounds.is_empty() {
            return None;
        }

        let mut pixmap = self.pool.borrow(width, height);
        self.with_ctx(width, height, |ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            let cpu_path = bezpath_to_cpu(path);
            match shape {
                Coverage::Fill { even_odd, .. } => {
                    ctx.set_fill_rule(if even_odd {
                        vello_cpu::peniko::Fill::EvenOdd
                    } else {
                        vello_cpu::peniko::Fill::NonZero
                    });
                    ctx.fill_path(&cpu_path);
                }
                Coverage::Stroke { width, .. } => {
                    ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
                    ctx.stroke_path(&cpu_path);
                }
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
        });

        let mut layer = Layer { pixmap, bounds };
        if !antialias {
            layer.threshold();
        }
        Some(layer)
    }

    /// Glyphs of `shaped` in their span colors, or all in `color` when given.
    pub(crate) fn glyphs(
        &mut self,
        width: u16,
        height: u16,
        shaped: &ShapedText,
        transform: Affine,
        color: Option<Rgba8>,
        antialias: bool,
    ) -> Option<Layer> {
        let text_box = Rect::new(0.0, 0.0, shaped.size.width, shaped.size.height);
        // Glyph ink can overhang the advance box (italics, accents).
        let pad = shaped.size.height * 0.5 + 2.0;
        let bbox = transform_bbox(text_box, transform).inflate(pad, pad);
        let bounds = PixelBounds::covering(bbox, u32::from(width), u32::from(height));
        if bounds.is_empty() {
            return None;
        }

        let mut pixmap = self.pool.borrow(width, height);
        self.with_ctx(width, height, |ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
            for line in shaped.layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let c = color.unwrap_or(run.style().brush);
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&shaped.font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
        });

        let mut layer = Layer { pixmap, bounds };
        if !antialias {
            layer.threshold();
        }
        Some(layer)
    }

    /// Hand a layer's pixmap back to the pool.
    pub(crate) fn recycle(&mut self, layer: Layer) {
        self.pool.release(layer.pixmap);
    }
}

fn transform_bbox(rect: Rect, transform: Affine) -> Rect {
    transform.transform_rect_bbox(rect)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
