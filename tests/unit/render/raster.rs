use kurbo::Shape;

use super::*;

fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    Rect::new(x0, y0, x1, y1).to_path(0.1)
}

#[test]
fn filled_rect_covers_its_pixels_only() {
    let mut r = Rasterizer::default();
    let path = rect_path(2.0, 2.0, 6.0, 6.0);
    let layer = r
        .coverage(
            10,
            10,
            Coverage::Fill {
                path: &path,
                even_odd: false,
            },
            Affine::IDENTITY,
            true,
        )
        .unwrap();
    assert_eq!(layer.coverage(3, 3), 255);
    assert_eq!(layer.coverage(5, 5), 255);
    assert_eq!(layer.coverage(1, 1), 0);
    assert_eq!(layer.coverage(6, 6), 0);
    assert!(layer.bounds.x0 <= 2 && layer.bounds.x1 >= 6);
    r.recycle(layer);
}

#[test]
fn offscreen_geometry_produces_no_layer() {
    let mut r = Rasterizer::default();
    let path = rect_path(50.0, 50.0, 60.0, 60.0);
    assert!(
        r.coverage(
            10,
            10,
            Coverage::Fill {
                path: &path,
                even_odd: false
            },
            Affine::IDENTITY,
            true
        )
        .is_none()
    );
}

#[test]
fn aliased_coverage_is_binary() {
    let mut r = Rasterizer::default();
    let circle = kurbo::Circle::new((8.0, 8.0), 5.3).to_path(0.1);
    let layer = r
        .coverage(
            16,
            16,
            Coverage::Fill {
                path: &circle,
                even_odd: false,
            },
            Affine::IDENTITY,
            false,
        )
        .unwrap();
    for y in 0..16 {
        for x in 0..16 {
            let c = layer.coverage(x, y);
            assert!(c == 0 || c == 255, "coverage {c} at ({x},{y})");
        }
    }
    assert_eq!(layer.coverage(8, 8), 255);
}

#[test]
fn stroke_covers_the_outline_not_the_interior() {
    let mut r = Rasterizer::default();
    let path = rect_path(2.0, 2.0, 18.0, 18.0);
    let layer = r
        .coverage(
            20,
            20,
            Coverage::Stroke {
                path: &path,
                width: 2.0,
            },
            Affine::IDENTITY,
            true,
        )
        .unwrap();
    assert!(layer.coverage(2, 10) > 0);
    assert_eq!(layer.coverage(10, 10), 0);
}

#[test]
fn transform_moves_coverage() {
    let mut r = Rasterizer::default();
    let path = rect_path(0.0, 0.0, 2.0, 2.0);
    let layer = r
        .coverage(
            10,
            10,
            Coverage::Fill {
                path: &path,
                even_odd: false,
            },
            Affine::translate((5.0, 5.0)),
            true,
        )
        .unwrap();
    assert_eq!(layer.coverage(0, 0), 0);
    assert_eq!(layer.coverage(5, 5), 255);
    assert_eq!(layer.pixel(5, 5), [255, 255, 255, 255]);
}
