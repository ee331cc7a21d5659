use kurbo::Shape;

use crate::assets::cache::ImageCache;
use crate::canvas::blend::composite_row;
use crate::canvas::state::{CanvasState, StateStack};
use crate::canvas::surface::Surface;
use crate::foundation::core::{Affine, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::ops::{DrawOp, ImageOp, TextAnchor, ellipse_path};
use crate::render::paint::{ImagePaint, Paint};
use crate::render::raster::{Coverage, Layer, Rasterizer};
use crate::text::engine::TextEngine;

/// Borrowed engine parts needed to run one op against one widget.
pub(crate) struct Executor<'a> {
    pub(crate) raster: &'a mut Rasterizer,
    pub(crate) text: &'a mut TextEngine,
    pub(crate) images: &'a ImageCache,
    pub(crate) auto_preload: bool,
}

impl Executor<'_> {
    pub(crate) fn run(
        &mut self,
        surface: &mut Surface,
        stack: &mut StateStack,
        op: &DrawOp,
    ) -> CanvasResult<()> {
        let state = *stack.current();
        match op {
            DrawOp::Shape { fill, stroke } => {
                if let Some(f) = fill {
                    let cov = Coverage::Fill {
                        path: &f.path,
                        even_odd: f.even_odd,
                    };
                    self.paint_coverage(surface, &state, cov, &Paint::Solid(f.color.premultiply()));
                }
                if let Some(s) = stroke {
                    let cov = Coverage::Stroke {
                        path: &s.path,
                        width: s.width,
                    };
                    self.paint_coverage(surface, &state, cov, &Paint::Solid(s.color.premultiply()));
                }
                Ok(())
            }
            DrawOp::Text {
                spans,
                font,
                anchor,
                shadow,
            } => {
                self.draw_text(surface, &state, spans, font, *anchor, *shadow);
                Ok(())
            }
            DrawOp::Image(img) => self.draw_image(surface, &state, img),
            DrawOp::Gradient {
                rect,
                from,
                to,
                direction,
            } => {
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return Ok(());
                }
                let path = rect.to_path(0.1);
                let paint = Paint::Linear {
                    rect: *rect,
                    from: *from,
                    to: *to,
                    direction: *direction,
                };
                self.paint_coverage(
                    surface,
                    &state,
                    Coverage::Fill {
                        path: &path,
                        even_odd: false,
                    },
                    &paint,
                );
                Ok(())
            }
            DrawOp::RadialGradient {
                center,
                radius,
                inner,
                outer,
            } => {
                if *radius <= 0.0 {
                    return Ok(());
                }
                let path = ellipse_path(*center, *radius, *radius);
                let paint = Paint::Radial {
                    center: *center,
                    radius: *radius,
                    inner: *inner,
                    outer: *outer,
                };
                self.paint_coverage(
                    surface,
                    &state,
                    Coverage::Fill {
                        path: &path,
                        even_odd: false,
                    },
                    &paint,
                );
                Ok(())
            }
            DrawOp::Clear(color) => {
                surface.clear(*color);
                Ok(())
            }
            DrawOp::SetPixel { x, y, color } => {
                surface.set_pixel(*x, *y, *color, state.clip);
                Ok(())
            }
            DrawOp::SetClip(clip) => {
                stack.current_mut().clip = *clip;
                Ok(())
            }
            DrawOp::SetBlend(mode) => {
                stack.current_mut().blend = *mode;
                Ok(())
            }
            DrawOp::SetHint(hint, enabled) => {
                stack.current_mut().hints.set(*hint, *enabled);
                Ok(())
            }
            DrawOp::Save => {
                stack.save();
                Ok(())
            }
            DrawOp::Restore => {
                if !stack.restore() {
                    tracing::debug!("restore on an empty state stack ignored");
                }
                Ok(())
            }
        }
    }

    fn paint_coverage(
        &mut self,
        surface: &mut Surface,
        state: &CanvasState,
        coverage: Coverage<'_>,
        paint: &Paint<'_>,
    ) {
        let (w, h) = surface_dims(surface);
        let Some(mask) = self.raster.coverage(
            w,
            h,
            coverage,
            Affine::IDENTITY,
            state.hints.antialiasing,
        ) else {
            return;
        };
        composite_masked(surface, &mask, paint, state);
        self.raster.recycle(mask);
    }

    fn draw_text(
        &mut self,
        surface: &mut Surface,
        state: &CanvasState,
        spans: &[crate::color::ColorSpan],
        font: &crate::text::font::FontSpec,
        anchor: TextAnchor,
        shadow: Option<(Vec2, Rgba8)>,
    ) {
        let Some(shaped) = self.text.shape(spans, font) else {
            return;
        };
        let origin = anchor.origin(shaped.size.width, shaped.size.height);
        let (w, h) = surface_dims(surface);
        let aa = state.hints.antialiasing;

        if let Some((offset, color)) = shadow {
            let at = Affine::translate(origin.to_vec2() + offset);
            if let Some(layer) = self.raster.glyphs(w, h, &shaped, at, Some(color), aa) {
                composite_layer(surface, &layer, state);
                self.raster.recycle(layer);
            }
        }

        let at = Affine::translate(origin.to_vec2());
        if let Some(layer) = self.raster.glyphs(w, h, &shaped, at, None, aa) {
            composite_layer(surface, &layer, state);
            self.raster.recycle(layer);
        }
    }

    fn draw_image(
        &mut self,
        surface: &mut Surface,
        state: &CanvasState,
        op: &ImageOp,
    ) -> CanvasResult<()> {
        let Some(image) = self.images.get_ready(&op.url) else {
            if self.auto_preload && self.images.state(&op.url).is_none() {
                tracing::debug!(url = %op.url, "starting background load for unseen image");
                drop(self.images.preload(&op.url));
            } else {
                tracing::debug!(url = %op.url, state = ?self.images.state(&op.url), "image not ready, skipping draw");
            }
            return Ok(());
        };

        let full = Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));
        let src = op.src.unwrap_or(full);
        check_source_rect(&op.url, src, image.width, image.height)?;

        let size = op.size.unwrap_or(Vec2::new(src.width(), src.height()));
        if size.x <= 0.0 || size.y <= 0.0 || op.alpha <= 0.0 {
            return Ok(());
        }

        let pivot = op.pivot.unwrap_or(Point::new(size.x * 0.5, size.y * 0.5)).to_vec2();
        let dest = Affine::translate(op.origin.to_vec2())
            * Affine::translate(pivot)
            * Affine::rotate(op.rotation)
            * Affine::translate(-pivot);
        let inverse = Affine::translate(src.origin().to_vec2())
            * Affine::scale_non_uniform(src.width() / size.x, src.height() / size.y)
            * dest.inverse();

        let paint = Paint::Image(ImagePaint {
            image: image.as_ref(),
            inverse,
            src,
            alpha: op.alpha.clamp(0.0, 1.0),
            tint: op.tint,
            bilinear: state.hints.bilinear(),
        });

        let local = Rect::new(0.0, 0.0, size.x, size.y).to_path(0.1);
        let (w, h) = surface_dims(surface);
        let aa = state.hints.antialiasing;
        if let Some(mask) = self.raster.coverage(
            w,
            h,
            Coverage::Fill {
                path: &local,
                even_odd: false,
            },
            dest,
            aa,
        ) {
            composite_masked(surface, &mask, &paint, state);
            self.raster.recycle(mask);
        }
        Ok(())
    }
}

/// `SourceOutOfBounds` unless `src` lies inside a `width x height` image.
pub(crate) fn check_source_rect(url: &str, src: Rect, width: u32, height: u32) -> CanvasResult<()> {
    let inside = src.x0 >= 0.0
        && src.y0 >= 0.0
        && src.x1 <= f64::from(width)
        && src.y1 <= f64::from(height)
        && src.width() > 0.0
        && src.height() > 0.0;
    if inside {
        return Ok(());
    }
    Err(CanvasError::SourceOutOfBounds {
        url: url.to_owned(),
        src: format!(
            "{}x{}+{}+{}",
            src.width(),
            src.height(),
            src.x0,
            src.y0
        ),
        width,
        height,
    })
}

fn surface_dims(surface: &Surface) -> (u16, u16) {
    // Surfaces are created through `CanvasSize`, which caps both edges at u16::MAX.
    (
        u16::try_from(surface.width()).unwrap_or(u16::MAX),
        u16::try_from(surface.height()).unwrap_or(u16::MAX),
    )
}

fn composite_masked(surface: &mut Surface, mask: &Layer, paint: &Paint<'_>, state: &CanvasState) {
    let bounds = mask.bounds.intersect_clip(state.clip);
    if bounds.is_empty() {
        return;
    }
    let stride = surface.width() as usize * 4;
    let mut row = vec![0u8; (bounds.x1 - bounds.x0) as usize * 4];
    let data = surface.data_mut();
    for y in bounds.y0..bounds.y1 {
        for (i, x) in (bounds.x0..bounds.x1).enumerate() {
            let cov = mask.coverage(x, y);
            let px = &mut row[i * 4..i * 4 + 4];
            if cov == 0 {
                px.fill(0);
                continue;
            }
            let src = paint.sample(x, y);
            if cov == 255 {
                px.copy_from_slice(&src);
            } else {
                for (d, s) in px.iter_mut().zip(src) {
                    *d = mul_div255_u8(u16::from(s), u16::from(cov));
                }
            }
        }
        let start = y as usize * stride + bounds.x0 as usize * 4;
        composite_row(&mut data[start..start + row.len()], &row, state.blend);
    }
}

fn composite_layer(surface: &mut Surface, layer: &Layer, state: &CanvasState) {
    let bounds = layer.bounds.intersect_clip(state.clip);
    if bounds.is_empty() {
        return;
    }
    let stride = surface.width() as usize * 4;
    let mut row = vec![0u8; (bounds.x1 - bounds.x0) as usize * 4];
    let data = surface.data_mut();
    for y in bounds.y0..bounds.y1 {
        for (i, x) in (bounds.x0..bounds.x1).enumerate() {
            row[i * 4..i * 4 + 4].copy_from_slice(&layer.pixel(x, y));
        }
        let start = y as usize * stride + bounds.x0 as usize * 4;
        composite_row(&mut data[start..start + row.len()], &row, state.blend);
    }
}
