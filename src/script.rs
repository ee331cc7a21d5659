use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context as _;

use crate::canvas::{BlendMode, RenderHint, WidgetRegistry};
use crate::engine::{DrawEngine, ShapeStyle};
use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::render::{GradientDirection, HAlign, VAlign};

/// A widget created before a script runs.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WidgetSpec {
    /// Widget id used by commands.
    pub id: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color the widget is cleared to before the first command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Recorded sequence of engine calls, replayable outside the client.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DrawScript {
    /// Widgets to create, in order.
    pub widgets: Vec<WidgetSpec>,
    /// Calls to replay, in order.
    pub commands: Vec<DrawCommand>,
}

fn one() -> f64 {
    1.0
}

fn default_font() -> String {
    "14px sans-serif".to_string()
}

/// One engine call. The `op` tag names the call in snake case.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    DrawLine {
        widget: String,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        #[serde(default = "one")]
        width: f64,
    },
    DrawRect {
        widget: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(flatten)]
        style: ShapeStyle,
    },
    DrawCircle {
        widget: String,
        x: f64,
        y: f64,
        radius: f64,
        #[serde(flatten)]
        style: ShapeStyle,
    },
    DrawEllipse {
        widget: String,
        x: f64,
        y: f64,
        rx: f64,
        ry: f64,
        #[serde(flatten)]
        style: ShapeStyle,
    },
    DrawPolygon {
        widget: String,
        points: Vec<[f64; 2]>,
        #[serde(flatten)]
        style: ShapeStyle,
    },
    DrawArc {
        widget: String,
        x: f64,
        y: f64,
        radius: f64,
        start: f64,
        end: f64,
        #[serde(flatten)]
        style: ShapeStyle,
    },
    DrawText {
        widget: String,
        text: String,
        x: f64,
        y: f64,
        #[serde(default = "default_font")]
        font: String,
    },
    DrawTextAligned {
        widget: String,
        text: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        align: HAlign,
        #[serde(default)]
        valign: VAlign,
        #[serde(default = "default_font")]
        font: String,
    },
    DrawTextWithShadow {
        widget: String,
        text: String,
        x: f64,
        y: f64,
        #[serde(default = "default_font")]
        font: String,
        shadow_color: String,
        #[serde(default = "one")]
        dx: f64,
        #[serde(default = "one")]
        dy: f64,
    },
    DrawImage {
        widget: String,
        url: String,
        x: f64,
        y: f64,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    DrawImageAlpha {
        widget: String,
        url: String,
        x: f64,
        y: f64,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
        alpha: f32,
        #[serde(default)]
        tint: Option<String>,
    },
    DrawImagePart {
        widget: String,
        url: String,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    DrawImageRotated {
        widget: String,
        url: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        angle: f64,
        #[serde(default)]
        pivot: Option<[f64; 2]>,
    },
    /// Load an image and wait for it, so later draws in the script can use it.
    PreloadImage { url: String },
    DrawGradient {
        widget: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        from: String,
        to: String,
        #[serde(default)]
        direction: GradientDirection,
    },
    DrawRadialGradient {
        widget: String,
        x: f64,
        y: f64,
        radius: f64,
        inner: String,
        outer: String,
    },
    Clear {
        widget: String,
        #[serde(default)]
        color: Option<String>,
    },
    SetClip {
        widget: String,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    ResetClip { widget: String },
    SetBlend { widget: String, mode: BlendMode },
    SetHint {
        widget: String,
        hint: RenderHint,
        enabled: bool,
    },
    Save { widget: String },
    Restore { widget: String },
    SetPixel {
        widget: String,
        x: i32,
        y: i32,
        color: String,
    },
    BeginBatch { widget: String },
    EndBatch { widget: String },
}

impl DrawCommand {
    /// Widget the command targets, if any.
    pub fn widget(&self) -> Option<&str> {
        use DrawCommand::*;
        match self {
            DrawLine { widget, .. }
            | DrawRect { widget, .. }
            | DrawCircle { widget, .. }
            | DrawEllipse { widget, .. }
            | DrawPolygon { widget, .. }
            | DrawArc { widget, .. }
            | DrawText { widget, .. }
            | DrawTextAligned { widget, .. }
            | DrawTextWithShadow { widget, .. }
            | DrawImage { widget, .. }
            | DrawImageAlpha { widget, .. }
            | DrawImagePart { widget, .. }
            | DrawImageRotated { widget, .. }
            | DrawGradient { widget, .. }
            | DrawRadialGradient { widget, .. }
            | Clear { widget, .. }
            | SetClip { widget, .. }
            | ResetClip { widget }
            | SetBlend { widget, .. }
            | SetHint { widget, .. }
            | Save { widget }
            | Restore { widget }
            | SetPixel { widget, .. }
            | BeginBatch { widget }
            | EndBatch { widget } => Some(widget.as_str()),
            PreloadImage { .. } => None,
        }
    }
}

impl DrawScript {
    /// Parse a script from JSON text.
    pub fn from_json_str(text: &str) -> CanvasResult<Self> {
        serde_json::from_str(text).map_err(|e| CanvasError::validation(format!("script: {e}")))
    }

    /// Read and parse a script file.
    pub fn from_path(path: &Path) -> CanvasResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check widget declarations and that every command targets a declared widget.
    pub fn validate(&self) -> CanvasResult<()> {
        let mut ids = BTreeSet::new();
        for w in &self.widgets {
            if w.id.trim().is_empty() {
                return Err(CanvasError::validation("widget id must be non-empty"));
            }
            if !ids.insert(w.id.as_str()) {
                return Err(CanvasError::validation(format!(
                    "widget '{}' declared twice",
                    w.id
                )));
            }
            if w.width == 0 || w.height == 0 {
                return Err(CanvasError::validation(format!(
                    "widget '{}' must have width/height > 0",
                    w.id
                )));
            }
        }
        for (i, cmd) in self.commands.iter().enumerate() {
            if let Some(id) = cmd.widget()
                && !ids.contains(id)
            {
                return Err(CanvasError::validation(format!(
                    "command {i} targets undeclared widget '{id}'"
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of [`run_script`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScriptReport {
    /// Commands that returned `Ok`.
    pub succeeded: usize,
    /// `(command index, error)` for commands that failed.
    pub failures: Vec<(usize, String)>,
    /// Batched ops skipped during `end_batch` flushes.
    pub batch_failures: usize,
}

/// Create the script's widgets in `engine` and replay its commands.
///
/// A failing command is recorded in the report and the script moves on, the same way a
/// plugin keeps running after a bad draw call.
#[tracing::instrument(level = "debug", skip_all, fields(commands = script.commands.len()))]
pub fn run_script(
    engine: &mut DrawEngine<WidgetRegistry>,
    script: &DrawScript,
) -> CanvasResult<ScriptReport> {
    script.validate()?;
    for w in &script.widgets {
        engine.create_widget(&w.id, w.width, w.height)?;
        if let Some(bg) = &w.background {
            engine.clear_widget(&w.id, Some(bg))?;
        }
    }

    let mut report = ScriptReport::default();
    for (i, cmd) in script.commands.iter().enumerate() {
        match apply(engine, cmd) {
            Ok(batch_failed) => {
                report.succeeded += 1;
                report.batch_failures += batch_failed;
            }
            Err(e) => {
                tracing::warn!(index = i, error = %e, "script command failed");
                report.failures.push((i, e.to_string()));
            }
        }
    }
    Ok(report)
}

fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::from_origin_size((x, y), (width, height))
}

fn dest_size(width: Option<f64>, height: Option<f64>) -> CanvasResult<Option<Vec2>> {
    match (width, height) {
        (Some(w), Some(h)) => Ok(Some(Vec2::new(w, h))),
        (None, None) => Ok(None),
        _ => Err(CanvasError::validation(
            "image size needs both width and height or neither",
        )),
    }
}

/// Run one command; returns the number of batched ops that failed during a flush.
fn apply(engine: &mut DrawEngine<WidgetRegistry>, cmd: &DrawCommand) -> CanvasResult<usize> {
    use DrawCommand::*;
    match cmd {
        DrawLine {
            widget,
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => engine.draw_line(
            widget,
            Point::new(*x1, *y1),
            Point::new(*x2, *y2),
            color,
            *width,
        )?,
        DrawRect {
            widget,
            x,
            y,
            width,
            height,
            style,
        } => engine.draw_rect(widget, rect(*x, *y, *width, *height), style)?,
        DrawCircle {
            widget,
            x,
            y,
            radius,
            style,
        } => engine.draw_circle(widget, Point::new(*x, *y), *radius, style)?,
        DrawEllipse {
            widget,
            x,
            y,
            rx,
            ry,
            style,
        } => engine.draw_ellipse(widget, Point::new(*x, *y), *rx, *ry, style)?,
        DrawPolygon {
            widget,
            points,
            style,
        } => {
            let points: Vec<Point> = points.iter().map(|&[x, y]| Point::new(x, y)).collect();
            engine.draw_polygon(widget, &points, style)?
        }
        DrawArc {
            widget,
            x,
            y,
            radius,
            start,
            end,
            style,
        } => engine.draw_arc(widget, Point::new(*x, *y), *radius, *start, *end, style)?,
        DrawText {
            widget,
            text,
            x,
            y,
            font,
        } => engine.draw_text(widget, text, Point::new(*x, *y), font)?,
        DrawTextAligned {
            widget,
            text,
            x,
            y,
            width,
            height,
            align,
            valign,
            font,
        } => engine.draw_text_aligned(
            widget,
            text,
            rect(*x, *y, *width, *height),
            *align,
            *valign,
            font,
        )?,
        DrawTextWithShadow {
            widget,
            text,
            x,
            y,
            font,
            shadow_color,
            dx,
            dy,
        } => engine.draw_text_with_shadow(
            widget,
            text,
            Point::new(*x, *y),
            font,
            shadow_color,
            Vec2::new(*dx, *dy),
        )?,
        DrawImage {
            widget,
            url,
            x,
            y,
            width,
            height,
        } => engine.draw_image(widget, url, Point::new(*x, *y), dest_size(*width, *height)?)?,
        DrawImageAlpha {
            widget,
            url,
            x,
            y,
            width,
            height,
            alpha,
            tint,
        } => engine.draw_image_alpha(
            widget,
            url,
            Point::new(*x, *y),
            dest_size(*width, *height)?,
            *alpha,
            tint.as_deref(),
        )?,
        DrawImagePart {
            widget,
            url,
            sx,
            sy,
            sw,
            sh,
            x,
            y,
            width,
            height,
        } => engine.draw_image_part(
            widget,
            url,
            rect(*sx, *sy, *sw, *sh),
            rect(*x, *y, *width, *height),
        )?,
        DrawImageRotated {
            widget,
            url,
            x,
            y,
            width,
            height,
            angle,
            pivot,
        } => engine.draw_image_rotated(
            widget,
            url,
            rect(*x, *y, *width, *height),
            *angle,
            pivot.map(|[px, py]| Point::new(px, py)),
        )?,
        PreloadImage { url } => {
            let info = engine.preload_image(url).wait()?;
            tracing::debug!(url = %info.url, width = info.width, height = info.height, "script image ready");
        }
        DrawGradient {
            widget,
            x,
            y,
            width,
            height,
            from,
            to,
            direction,
        } => engine.draw_gradient(widget, rect(*x, *y, *width, *height), from, to, *direction)?,
        DrawRadialGradient {
            widget,
            x,
            y,
            radius,
            inner,
            outer,
        } => engine.draw_radial_gradient(widget, Point::new(*x, *y), *radius, inner, outer)?,
        Clear { widget, color } => engine.clear_widget(widget, color.as_deref())?,
        SetClip {
            widget,
            x,
            y,
            width,
            height,
        } => engine.set_clip_region(widget, *x, *y, *width, *height)?,
        ResetClip { widget } => engine.reset_clip_region(widget)?,
        SetBlend { widget, mode } => engine.set_blend_mode(widget, *mode)?,
        SetHint {
            widget,
            hint,
            enabled,
        } => engine.set_render_hint(widget, *hint, *enabled)?,
        Save { widget } => engine.save_canvas(widget)?,
        Restore { widget } => engine.restore_canvas(widget)?,
        SetPixel {
            widget,
            x,
            y,
            color,
        } => engine.set_pixel(widget, *x, *y, color)?,
        BeginBatch { widget } => engine.begin_batch(widget)?,
        EndBatch { widget } => return Ok(engine.end_batch(widget)?.failed),
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_commands_with_defaults() {
        let script = DrawScript::from_json_str(
            r##"{
                "widgets": [{"id": "map", "width": 32, "height": 16}],
                "commands": [
                    {"op": "draw_rect", "widget": "map", "x": 1, "y": 2, "width": 3, "height": 4, "fill": "#f00"},
                    {"op": "draw_line", "widget": "map", "x1": 0, "y1": 0, "x2": 5, "y2": 5, "color": "blue"},
                    {"op": "set_blend", "widget": "map", "mode": "color-dodge"},
                    {"op": "preload_image", "url": "icons/sword.png"}
                ]
            }"##,
        )
        .unwrap();
        script.validate().unwrap();
        assert_eq!(script.commands.len(), 4);
        match &script.commands[0] {
            DrawCommand::DrawRect { style, width, .. } => {
                assert_eq!(style.fill.as_deref(), Some("#f00"));
                assert_eq!(style.stroke, None);
                assert_eq!(style.line_width, 1.0);
                assert_eq!(*width, 3.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &script.commands[1] {
            DrawCommand::DrawLine { width, .. } => assert_eq!(*width, 1.0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(script.commands[3].widget().is_none());
    }

    #[test]
    fn validate_rejects_undeclared_widget() {
        let script = DrawScript::from_json_str(
            r#"{"widgets": [], "commands": [{"op": "save", "widget": "ghost"}]}"#,
        )
        .unwrap();
        assert!(matches!(script.validate(), Err(CanvasError::Validation(_))));
    }

    #[test]
    fn validate_rejects_duplicate_and_empty_widgets() {
        let dup = DrawScript::from_json_str(
            r#"{"widgets": [{"id": "a", "width": 1, "height": 1}, {"id": "a", "width": 2, "height": 2}], "commands": []}"#,
        )
        .unwrap();
        assert!(dup.validate().is_err());
        let empty = DrawScript::from_json_str(
            r#"{"widgets": [{"id": "a", "width": 0, "height": 1}], "commands": []}"#,
        )
        .unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn image_alpha_takes_an_optional_size_pair() {
        let script = DrawScript::from_json_str(
            r#"{
                "widgets": [{"id": "w", "width": 8, "height": 8}],
                "commands": [
                    {"op": "draw_image_alpha", "widget": "w", "url": "a.png", "x": 0, "y": 0, "width": 100, "height": 100, "alpha": 0.5},
                    {"op": "draw_image_alpha", "widget": "w", "url": "a.png", "x": 0, "y": 0, "alpha": 0.5}
                ]
            }"#,
        )
        .unwrap();
        match &script.commands[0] {
            DrawCommand::DrawImageAlpha { width, height, .. } => {
                assert_eq!((*width, *height), (Some(100.0), Some(100.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            dest_size(Some(100.0), Some(100.0)).unwrap(),
            Some(Vec2::new(100.0, 100.0))
        );
        assert_eq!(dest_size(None, None).unwrap(), None);
        assert!(dest_size(Some(1.0), None).is_err());
    }

    #[test]
    fn unknown_op_is_a_parse_error() {
        assert!(
            DrawScript::from_json_str(r#"{"widgets": [], "commands": [{"op": "explode"}]}"#)
                .is_err()
        );
    }
}
