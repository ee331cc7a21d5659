use super::*;

#[test]
fn premultiply_roundtrip_opaque_is_exact() {
    let c = Rgba8::opaque(255, 0, 0);
    let p = c.premultiply();
    assert_eq!(p.to_array(), [255, 0, 0, 255]);
    assert_eq!(p.to_straight(), c);
}

#[test]
fn premultiply_half_alpha() {
    let p = Rgba8::new(200, 100, 0, 128).premultiply();
    assert_eq!(p.a, 128);
    assert_eq!(p.r, ((200u16 * 128 + 127) / 255) as u8);
    let back = p.to_straight();
    assert!((i16::from(back.r) - 200).abs() <= 1);
    assert!((i16::from(back.g) - 100).abs() <= 1);
}

#[test]
fn transparent_premul_unpremultiplies_to_sentinel() {
    assert_eq!(Rgba8Premul::default().to_straight(), Rgba8::TRANSPARENT);
}

#[test]
fn clip_rect_is_half_open() {
    let c = ClipRect::new(2, 3, 4, 5);
    assert!(c.contains(2, 3));
    assert!(c.contains(5, 7));
    assert!(!c.contains(6, 7));
    assert!(!c.contains(5, 8));
    assert!(!c.contains(1, 3));
}

#[test]
fn pixel_bounds_intersect_clip() {
    let b = PixelBounds::full(10, 10).intersect_clip(Some(ClipRect::new(-5, 2, 8, 100)));
    assert_eq!(
        b,
        PixelBounds {
            x0: 0,
            y0: 2,
            x1: 3,
            y1: 10
        }
    );

    let empty = PixelBounds::full(10, 10).intersect_clip(Some(ClipRect::new(20, 20, 5, 5)));
    assert!(empty.is_empty());
}

#[test]
fn pixel_bounds_covering_grows_and_clamps() {
    let b = PixelBounds::covering(Rect::new(2.5, 2.5, 4.0, 4.0), 5, 5);
    assert_eq!(
        b,
        PixelBounds {
            x0: 1,
            y0: 1,
            x1: 5,
            y1: 5
        }
    );
}

#[test]
fn canvas_size_rejects_zero_and_oversize() {
    assert!(CanvasSize::new(0, 10).is_err());
    assert!(CanvasSize::new(70_000, 10).is_err());
    assert_eq!(
        CanvasSize::new(320, 200).unwrap(),
        CanvasSize {
            width: 320,
            height: 200
        }
    );
}
