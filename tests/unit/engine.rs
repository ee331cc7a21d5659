use super::*;

fn engine() -> DrawEngine {
    let settings = CanvasSettings {
        system_fonts: false,
        ..CanvasSettings::default()
    };
    let mut e = DrawEngine::with_parts(
        WidgetRegistry::new(),
        settings,
        ImageCache::default(),
        TextEngine::new(false, &[]),
    );
    e.create_widget("w", 16, 16).unwrap();
    e
}

fn queued(e: &DrawEngine, widget: &str) -> Vec<&'static str> {
    e.widgets
        .get(widget)
        .and_then(|w| w.batch.as_ref())
        .map(|q| q.iter().map(DrawOp::kind).collect())
        .unwrap_or_default()
}

#[test]
fn batching_queues_draw_and_state_ops_in_order() {
    let mut e = engine();
    e.begin_batch("w").unwrap();
    e.save_canvas("w").unwrap();
    e.set_clip_region("w", 0, 0, 4, 4).unwrap();
    e.draw_rect("w", Rect::new(0.0, 0.0, 8.0, 8.0), &ShapeStyle::filled("red"))
        .unwrap();
    e.restore_canvas("w").unwrap();
    assert_eq!(queued(&e, "w"), ["save", "set-clip", "shape", "restore"]);
    assert_eq!(e.get_pixel("w", 1, 1).unwrap(), Rgba8::TRANSPARENT);

    let report = e.end_batch("w").unwrap();
    assert_eq!(
        report,
        BatchReport {
            executed: 4,
            failed: 0
        }
    );
    assert!(!e.is_batching("w"));
    assert_eq!(e.get_pixel("w", 1, 1).unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(e.get_pixel("w", 6, 6).unwrap(), Rgba8::TRANSPARENT);
}

#[test]
fn style_without_fill_or_stroke_is_not_queued() {
    let mut e = engine();
    e.begin_batch("w").unwrap();
    e.draw_rect("w", Rect::new(0.0, 0.0, 4.0, 4.0), &ShapeStyle::default())
        .unwrap();
    e.draw_line(
        "w",
        Point::new(0.0, 0.0),
        Point::new(4.0, 4.0),
        "red",
        0.0,
    )
    .unwrap();
    assert!(queued(&e, "w").is_empty());
}

#[test]
fn lookup_failure_drops_engine_state() {
    let mut e = engine();
    e.begin_batch("w").unwrap();
    e.registry_mut().destroy("w");
    assert!(matches!(
        e.end_batch("w"),
        Err(CanvasError::UnknownWidget(id)) if id == "w"
    ));
    assert!(!e.widgets.contains_key("w"));
}

#[test]
fn recreated_widget_starts_fresh() {
    let mut e = engine();
    e.set_blend_mode("w", BlendMode::Multiply).unwrap();
    e.begin_batch("w").unwrap();
    e.create_widget("w", 8, 8).unwrap();
    assert!(!e.is_batching("w"));
    assert_eq!(e.canvas_state("w").unwrap(), CanvasState::default());
    assert_eq!(e.get_canvas_width("w").unwrap(), 8);
}

#[test]
fn bad_default_font_falls_back() {
    let settings = CanvasSettings {
        system_fonts: false,
        default_font: "huge".to_owned(),
        ..CanvasSettings::default()
    };
    let e = DrawEngine::with_parts(
        WidgetRegistry::new(),
        settings,
        ImageCache::default(),
        TextEngine::new(false, &[]),
    );
    assert_eq!(e.default_font, FontSpec::default());
    assert_eq!(e.font("not a font"), FontSpec::default());
}

#[test]
fn queries_reuse_the_existing_widget_state() {
    let mut e = engine();
    e.set_clip_region("w", 1, 1, 4, 4).unwrap();
    e.begin_batch("w").unwrap();
    e.save_canvas("w").unwrap();
    for _ in 0..10 {
        e.get_pixel("w", 0, 0).unwrap();
        e.get_canvas_width("w").unwrap();
    }
    assert_eq!(e.widgets.len(), 1);
    assert_eq!(queued(&e, "w"), ["save"]);
    assert_eq!(
        e.canvas_state("w").unwrap().clip,
        Some(ClipRect::new(1, 1, 4, 4))
    );
}
