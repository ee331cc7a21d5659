use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::cache::{ImageCache, ImageLoad};
use crate::assets::fetch::DefaultFetcher;
use crate::canvas::blend::BlendMode;
use crate::canvas::registry::{SurfaceRegistry, WidgetRegistry};
use crate::canvas::state::{CanvasState, RenderHint, StateStack};
use crate::color::{colorize, resolve_color};
use crate::foundation::config::CanvasSettings;
use crate::foundation::core::{BezPath, CanvasSize, ClipRect, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::exec::{Executor, check_source_rect};
use crate::render::ops::{
    DrawOp, FillOp, HAlign, ImageOp, StrokeOp, TextAnchor, VAlign, arc_path, ellipse_path,
    line_path, pie_path, polygon_path,
};
use crate::render::paint::GradientDirection;
use crate::render::raster::Rasterizer;
use crate::text::engine::{TextEngine, TextSize};
use crate::text::font::FontSpec;

/// Fill and stroke colors for shape primitives.
///
/// Colors go through [`resolve_color`], so any accepted color text works and
/// unparsable text draws opaque black.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    /// Interior color; `None` leaves the interior untouched.
    pub fill: Option<String>,
    /// Outline color; `None` draws no outline.
    pub stroke: Option<String>,
    /// Outline width in pixels.
    pub line_width: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            line_width: 1.0,
        }
    }
}

impl ShapeStyle {
    /// Fill only.
    pub fn filled(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Self::default()
        }
    }

    /// Outline only.
    pub fn stroked(color: impl Into<String>, line_width: f64) -> Self {
        Self {
            stroke: Some(color.into()),
            line_width,
            ..Self::default()
        }
    }

    /// Add or replace the fill color.
    pub fn with_fill(mut self, color: impl Into<String>) -> Self {
        self.fill = Some(color.into());
        self
    }

    /// Add or replace the outline.
    pub fn with_stroke(mut self, color: impl Into<String>, line_width: f64) -> Self {
        self.stroke = Some(color.into());
        self.line_width = line_width;
        self
    }
}

/// Outcome of [`DrawEngine::end_batch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchReport {
    /// Ops that ran.
    pub executed: usize,
    /// Ops that failed and were skipped.
    pub failed: usize,
}

#[derive(Debug, Default)]
struct WidgetState {
    stack: StateStack,
    batch: Option<Vec<DrawOp>>,
}

/// Immediate-mode drawing front end over a set of widget surfaces.
///
/// Every call naming a widget first resolves it through the registry and fails with
/// [`CanvasError::UnknownWidget`] when it is missing. While a widget is batching, draw
/// and state calls are queued and run in order by [`DrawEngine::end_batch`].
pub struct DrawEngine<R: SurfaceRegistry = WidgetRegistry> {
    registry: R,
    images: ImageCache,
    text: TextEngine,
    raster: Rasterizer,
    widgets: HashMap<String, WidgetState>,
    settings: CanvasSettings,
    default_font: FontSpec,
}

impl<R: SurfaceRegistry> std::fmt::Debug for DrawEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawEngine")
            .field("images", &self.images)
            .field("text", &self.text)
            .field("widgets", &self.widgets.len())
            .finish_non_exhaustive()
    }
}

impl<R: SurfaceRegistry> DrawEngine<R> {
    /// Engine with an image cache and font database built from `settings`.
    pub fn new(registry: R, settings: CanvasSettings) -> Self {
        let fetcher = Arc::new(DefaultFetcher::new(settings.asset_root.clone()));
        let images = ImageCache::with_fetcher(settings.image_cache, fetcher);
        let text = TextEngine::from_settings(&settings);
        Self::with_parts(registry, settings, images, text)
    }

    /// Engine sharing an existing image cache and text engine.
    pub fn with_parts(
        registry: R,
        settings: CanvasSettings,
        images: ImageCache,
        text: TextEngine,
    ) -> Self {
        let default_font = FontSpec::parse(&settings.default_font).unwrap_or_else(|e| {
            tracing::warn!(font = %settings.default_font, error = %e, "bad default font, using 14px sans-serif");
            FontSpec::default()
        });
        Self {
            registry,
            images,
            text,
            raster: Rasterizer::default(),
            widgets: HashMap::new(),
            settings,
            default_font,
        }
    }

    /// Surface owner.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Mutable surface owner, for creating and destroying widgets.
    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// Shared image cache handle.
    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Text engine, for registering application fonts.
    pub fn text_engine_mut(&mut self) -> &mut TextEngine {
        &mut self.text
    }

    /// Active settings.
    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    /// Drop engine-side state (batch queue, state stack) for `widget`.
    pub fn forget_widget(&mut self, widget: &str) {
        if self.widgets.remove(widget).is_some() {
            tracing::debug!(widget, "forgot widget state");
        }
    }

    // Shapes

    /// Straight line from `from` to `to`.
    pub fn draw_line(
        &mut self,
        widget: &str,
        from: Point,
        to: Point,
        color: &str,
        width: f64,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let Some(stroke) = stroke_op(line_path(from, to), Some(color), width) else {
            return Ok(());
        };
        self.submit(
            widget,
            DrawOp::Shape {
                fill: None,
                stroke: Some(stroke),
            },
        )
    }

    /// Axis-aligned rectangle.
    pub fn draw_rect(&mut self, widget: &str, rect: Rect, style: &ShapeStyle) -> CanvasResult<()> {
        let path = kurbo::Shape::to_path(&rect.abs(), 0.1);
        self.draw_shape(widget, style, path.clone(), path, false)
    }

    /// Circle around `center`.
    pub fn draw_circle(
        &mut self,
        widget: &str,
        center: Point,
        radius: f64,
        style: &ShapeStyle,
    ) -> CanvasResult<()> {
        self.draw_ellipse(widget, center, radius, radius, style)
    }

    /// Axis-aligned ellipse around `center`.
    pub fn draw_ellipse(
        &mut self,
        widget: &str,
        center: Point,
        rx: f64,
        ry: f64,
        style: &ShapeStyle,
    ) -> CanvasResult<()> {
        let path = ellipse_path(center, rx.abs(), ry.abs());
        self.draw_shape(widget, style, path.clone(), path, false)
    }

    /// Closed polygon filled with the even-odd rule.
    pub fn draw_polygon(
        &mut self,
        widget: &str,
        points: &[Point],
        style: &ShapeStyle,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        if points.len() < 3 {
            return Err(CanvasError::InsufficientPoints(points.len()));
        }
        let path = polygon_path(points);
        self.draw_shape(widget, style, path.clone(), path, true)
    }

    /// Arc from `start` to `end` radians, clockwise from the positive x axis.
    ///
    /// The fill covers the pie sector, the stroke follows the curve only.
    pub fn draw_arc(
        &mut self,
        widget: &str,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        style: &ShapeStyle,
    ) -> CanvasResult<()> {
        let radius = radius.abs();
        self.draw_shape(
            widget,
            style,
            pie_path(center, radius, start, end),
            arc_path(center, radius, start, end),
            false,
        )
    }

    fn draw_shape(
        &mut self,
        widget: &str,
        style: &ShapeStyle,
        fill_path: BezPath,
        stroke_path: BezPath,
        even_odd: bool,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let fill = style.fill.as_deref().map(|c| FillOp {
            path: fill_path,
            color: resolve_color(c),
            even_odd,
        });
        let stroke = stroke_op(stroke_path, style.stroke.as_deref(), style.line_width);
        if fill.is_none() && stroke.is_none() {
            return Ok(());
        }
        self.submit(widget, DrawOp::Shape { fill, stroke })
    }

    // Text

    /// MUD-colored text with its top-left corner at `origin`.
    pub fn draw_text(
        &mut self,
        widget: &str,
        text: &str,
        origin: Point,
        font: &str,
    ) -> CanvasResult<()> {
        self.draw_text_at(widget, text, font, TextAnchor::TopLeft(origin), None)
    }

    /// Text aligned inside `bounds`.
    pub fn draw_text_aligned(
        &mut self,
        widget: &str,
        text: &str,
        bounds: Rect,
        h: HAlign,
        v: VAlign,
        font: &str,
    ) -> CanvasResult<()> {
        let anchor = TextAnchor::Boxed {
            bounds: bounds.abs(),
            h,
            v,
        };
        self.draw_text_at(widget, text, font, anchor, None)
    }

    /// Text drawn once in `shadow_color` shifted by `offset`, then colorized on top.
    pub fn draw_text_with_shadow(
        &mut self,
        widget: &str,
        text: &str,
        origin: Point,
        font: &str,
        shadow_color: &str,
        offset: Vec2,
    ) -> CanvasResult<()> {
        let shadow = Some((offset, resolve_color(shadow_color)));
        self.draw_text_at(widget, text, font, TextAnchor::TopLeft(origin), shadow)
    }

    fn draw_text_at(
        &mut self,
        widget: &str,
        text: &str,
        font: &str,
        anchor: TextAnchor,
        shadow: Option<(Vec2, Rgba8)>,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let spans = colorize(text, Rgba8::WHITE);
        if spans.is_empty() {
            return Ok(());
        }
        let font = self.font(font);
        self.submit(
            widget,
            DrawOp::Text {
                spans,
                font,
                anchor,
                shadow,
            },
        )
    }

    /// Layout box of `text` as [`DrawEngine::draw_text`] would render it.
    pub fn measure_text(&mut self, text: &str, font: &str) -> TextSize {
        let font = self.font(font);
        self.text.measure(text, &font)
    }

    fn font(&self, text: &str) -> FontSpec {
        FontSpec::parse(text).unwrap_or_else(|e| {
            tracing::warn!(font = text, error = %e, "unparsable font, using default");
            self.default_font.clone()
        })
    }

    // Images

    /// Start loading `url` in the background.
    pub fn preload_image(&self, url: &str) -> ImageLoad {
        self.images.preload(url)
    }

    /// Whole image at `origin`, scaled to `size` when given.
    pub fn draw_image(
        &mut self,
        widget: &str,
        url: &str,
        origin: Point,
        size: Option<Vec2>,
    ) -> CanvasResult<()> {
        self.submit_image(widget, image_op(url, origin, size))
    }

    /// Whole image at `origin`, scaled to `size` when given, with `alpha` in `[0, 1]` and
    /// an optional multiply tint.
    ///
    /// Fully transparent draws are dropped without being queued.
    pub fn draw_image_alpha(
        &mut self,
        widget: &str,
        url: &str,
        origin: Point,
        size: Option<Vec2>,
        alpha: f32,
        tint: Option<&str>,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        if alpha == 0.0 {
            tracing::debug!(widget, url, "alpha 0 image draw skipped");
            return Ok(());
        }
        let op = ImageOp {
            alpha,
            tint: tint.map(resolve_color),
            ..image_op(url, origin, size)
        };
        self.submit_image(widget, op)
    }

    /// `src` (image pixels) of the image scaled into `dest`.
    pub fn draw_image_part(
        &mut self,
        widget: &str,
        url: &str,
        src: Rect,
        dest: Rect,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        if !(src.width() > 0.0 && src.height() > 0.0) {
            return Err(CanvasError::validation(format!(
                "source rect for '{url}' must have a positive size"
            )));
        }
        let op = ImageOp {
            src: Some(src),
            ..image_op(url, dest.origin(), Some(dest.size().to_vec2()))
        };
        self.submit_image(widget, op)
    }

    /// Image in `dest` rotated by `angle` radians (clockwise) about `pivot`.
    ///
    /// `pivot` is relative to the top-left of `dest` and defaults to its center.
    pub fn draw_image_rotated(
        &mut self,
        widget: &str,
        url: &str,
        dest: Rect,
        angle: f64,
        pivot: Option<Point>,
    ) -> CanvasResult<()> {
        let op = ImageOp {
            rotation: angle,
            pivot,
            ..image_op(url, dest.origin(), Some(dest.size().to_vec2()))
        };
        self.submit_image(widget, op)
    }

    fn submit_image(&mut self, widget: &str, op: ImageOp) -> CanvasResult<()> {
        self.check_widget(widget)?;
        if let (Some(src), Some(image)) = (op.src, self.images.get_ready(&op.url)) {
            check_source_rect(&op.url, src, image.width, image.height)?;
        }
        self.submit(widget, DrawOp::Image(op))
    }

    // Gradients

    /// Linear gradient filling `rect`.
    pub fn draw_gradient(
        &mut self,
        widget: &str,
        rect: Rect,
        from: &str,
        to: &str,
        direction: GradientDirection,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let op = DrawOp::Gradient {
            rect: rect.abs(),
            from: resolve_color(from),
            to: resolve_color(to),
            direction,
        };
        self.submit(widget, op)
    }

    /// Radial gradient filling the disc of `radius` around `center`.
    pub fn draw_radial_gradient(
        &mut self,
        widget: &str,
        center: Point,
        radius: f64,
        inner: &str,
        outer: &str,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let op = DrawOp::RadialGradient {
            center,
            radius: radius.abs(),
            inner: resolve_color(inner),
            outer: resolve_color(outer),
        };
        self.submit(widget, op)
    }

    // Pixels and state

    /// Reset every pixel to `color`, or transparent black. Ignores the clip.
    pub fn clear_widget(&mut self, widget: &str, color: Option<&str>) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let color = color.map(resolve_color).unwrap_or(Rgba8::TRANSPARENT);
        self.submit(widget, DrawOp::Clear(color))
    }

    /// Clip later draws to `[x, x+width) x [y, y+height)`.
    pub fn set_clip_region(
        &mut self,
        widget: &str,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        self.submit(
            widget,
            DrawOp::SetClip(Some(ClipRect::new(x, y, width, height))),
        )
    }

    /// Remove the clip from the current state.
    pub fn reset_clip_region(&mut self, widget: &str) -> CanvasResult<()> {
        self.check_widget(widget)?;
        self.submit(widget, DrawOp::SetClip(None))
    }

    /// Compositing mode for later draws.
    pub fn set_blend_mode(&mut self, widget: &str, mode: BlendMode) -> CanvasResult<()> {
        self.check_widget(widget)?;
        self.submit(widget, DrawOp::SetBlend(mode))
    }

    /// Toggle a render hint for later draws.
    pub fn set_render_hint(
        &mut self,
        widget: &str,
        hint: RenderHint,
        enabled: bool,
    ) -> CanvasResult<()> {
        self.check_widget(widget)?;
        self.submit(widget, DrawOp::SetHint(hint, enabled))
    }

    /// Push a copy of the current state.
    pub fn save_canvas(&mut self, widget: &str) -> CanvasResult<()> {
        self.check_widget(widget)?;
        self.submit(widget, DrawOp::Save)
    }

    /// Pop the last saved state. Does nothing when nothing was saved.
    pub fn restore_canvas(&mut self, widget: &str) -> CanvasResult<()> {
        self.check_widget(widget)?;
        self.submit(widget, DrawOp::Restore)
    }

    /// Write one pixel without blending. Honors the clip; out of bounds is ignored.
    pub fn set_pixel(&mut self, widget: &str, x: i32, y: i32, color: &str) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let color = resolve_color(color);
        self.submit(widget, DrawOp::SetPixel { x, y, color })
    }

    /// Straight color at `(x, y)`; transparent black out of bounds.
    pub fn get_pixel(&mut self, widget: &str, x: i32, y: i32) -> CanvasResult<Rgba8> {
        Ok(self.surface(widget)?.get_pixel(x, y))
    }

    /// Surface width in pixels.
    pub fn get_canvas_width(&mut self, widget: &str) -> CanvasResult<u32> {
        Ok(self.surface(widget)?.width())
    }

    /// Surface height in pixels.
    pub fn get_canvas_height(&mut self, widget: &str) -> CanvasResult<u32> {
        Ok(self.surface(widget)?.height())
    }

    /// Surface size in pixels.
    pub fn get_canvas_size(&mut self, widget: &str) -> CanvasResult<CanvasSize> {
        Ok(self.surface(widget)?.size())
    }

    /// Current (not queued) canvas state of `widget`.
    pub fn canvas_state(&mut self, widget: &str) -> CanvasResult<CanvasState> {
        self.check_widget(widget)?;
        Ok(self
            .widgets
            .get(widget)
            .map(|w| *w.stack.current())
            .unwrap_or_default())
    }

    fn surface(&mut self, widget: &str) -> CanvasResult<&crate::canvas::surface::Surface> {
        self.check_widget(widget)?;
        self.registry
            .resolve(widget)
            .ok_or_else(|| CanvasError::unknown_widget(widget))
    }

    // Batching

    /// Start queueing draw and state calls on `widget`.
    pub fn begin_batch(&mut self, widget: &str) -> CanvasResult<()> {
        self.check_widget(widget)?;
        let Some(state) = self.widgets.get_mut(widget) else {
            return Err(CanvasError::unknown_widget(widget));
        };
        if state.batch.is_some() {
            return Err(CanvasError::AlreadyBatching(widget.to_owned()));
        }
        state.batch = Some(Vec::new());
        Ok(())
    }

    /// Run every queued call on `widget` in order and return to immediate mode.
    ///
    /// A queued call that fails is logged and skipped.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn end_batch(&mut self, widget: &str) -> CanvasResult<BatchReport> {
        self.check_widget(widget)?;
        let queue = self
            .widgets
            .get_mut(widget)
            .and_then(|w| w.batch.take())
            .ok_or_else(|| CanvasError::NotBatching(widget.to_owned()))?;

        let mut report = BatchReport::default();
        for op in &queue {
            match self.execute(widget, op) {
                Ok(()) => report.executed += 1,
                Err(e) => {
                    tracing::warn!(widget, op = op.kind(), error = %e, "batched op failed, skipping");
                    report.failed += 1;
                }
            }
        }
        tracing::debug!(
            widget,
            executed = report.executed,
            failed = report.failed,
            "batch flushed"
        );
        Ok(report)
    }

    /// Whether `widget` is between `begin_batch` and `end_batch`.
    pub fn is_batching(&self, widget: &str) -> bool {
        self.widgets
            .get(widget)
            .is_some_and(|w| w.batch.is_some())
    }

    fn check_widget(&mut self, widget: &str) -> CanvasResult<()> {
        if self.registry.resolve(widget).is_none() {
            if self.widgets.remove(widget).is_some() {
                tracing::debug!(widget, "widget vanished, dropping its state");
            }
            return Err(CanvasError::unknown_widget(widget));
        }
        if !self.widgets.contains_key(widget) {
            self.widgets.insert(widget.to_owned(), WidgetState::default());
        }
        Ok(())
    }

    fn submit(&mut self, widget: &str, op: DrawOp) -> CanvasResult<()> {
        if let Some(queue) = self
            .widgets
            .get_mut(widget)
            .and_then(|w| w.batch.as_mut())
        {
            queue.push(op);
            return Ok(());
        }
        self.execute(widget, &op)
    }

    fn execute(&mut self, widget: &str, op: &DrawOp) -> CanvasResult<()> {
        let surface = self
            .registry
            .resolve_mut(widget)
            .ok_or_else(|| CanvasError::unknown_widget(widget))?;
        if !self.widgets.contains_key(widget) {
            self.widgets.insert(widget.to_owned(), WidgetState::default());
        }
        let Some(state) = self.widgets.get_mut(widget) else {
            return Err(CanvasError::unknown_widget(widget));
        };
        let stack = &mut state.stack;
        let mut exec = Executor {
            raster: &mut self.raster,
            text: &mut self.text,
            images: &self.images,
            auto_preload: self.settings.auto_preload,
        };
        exec.run(surface, stack, op)
    }
}

impl DrawEngine<WidgetRegistry> {
    /// Engine over an empty in-memory registry.
    pub fn in_memory(settings: CanvasSettings) -> Self {
        Self::new(WidgetRegistry::new(), settings)
    }

    /// Register a transparent widget surface.
    pub fn create_widget(&mut self, widget: &str, width: u32, height: u32) -> CanvasResult<()> {
        let size = CanvasSize::new(width, height)?;
        self.registry.create(widget, size);
        self.widgets.remove(widget);
        Ok(())
    }

    /// Remove a widget surface and its engine-side state.
    pub fn destroy_widget(&mut self, widget: &str) -> bool {
        self.forget_widget(widget);
        self.registry.destroy(widget)
    }
}

fn stroke_op(path: BezPath, color: Option<&str>, width: f64) -> Option<StrokeOp> {
    let color = color?;
    if !(width.is_finite() && width > 0.0) {
        return None;
    }
    Some(StrokeOp {
        path,
        color: resolve_color(color),
        width,
    })
}

fn image_op(url: &str, origin: Point, size: Option<Vec2>) -> ImageOp {
    ImageOp {
        url: url.to_owned(),
        origin,
        size,
        src: None,
        rotation: 0.0,
        pivot: None,
        alpha: 1.0,
        tint: None,
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
