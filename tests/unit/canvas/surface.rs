use super::*;

fn surface(w: u32, h: u32) -> Surface {
    Surface::new(CanvasSize::new(w, h).unwrap())
}

#[test]
fn new_surface_is_transparent() {
    let s = surface(4, 3);
    assert_eq!(s.data().len(), 4 * 3 * 4);
    assert_eq!(s.get_pixel(0, 0), Rgba8::TRANSPARENT);
    assert_eq!(s.size(), CanvasSize::new(4, 3).unwrap());
}

#[test]
fn set_then_get_round_trips_opaque_colors() {
    let mut s = surface(4, 4);
    s.set_pixel(2, 1, Rgba8::opaque(12, 34, 56), None);
    assert_eq!(s.get_pixel(2, 1), Rgba8::opaque(12, 34, 56));
}

#[test]
fn set_pixel_does_not_blend() {
    let mut s = surface(2, 2);
    s.set_pixel(0, 0, Rgba8::opaque(255, 0, 0), None);
    s.set_pixel(0, 0, Rgba8::TRANSPARENT, None);
    assert_eq!(s.get_pixel(0, 0), Rgba8::TRANSPARENT);
}

#[test]
fn out_of_bounds_reads_transparent_and_writes_are_ignored() {
    let mut s = surface(2, 2);
    assert_eq!(s.get_pixel(-1, 0), Rgba8::TRANSPARENT);
    assert_eq!(s.get_pixel(2, 0), Rgba8::TRANSPARENT);
    s.set_pixel(5, 5, Rgba8::WHITE, None);
    s.set_pixel(-1, 1, Rgba8::WHITE, None);
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn set_pixel_honors_clip() {
    let mut s = surface(4, 4);
    let clip = Some(ClipRect::new(1, 1, 2, 2));
    s.set_pixel(0, 0, Rgba8::WHITE, clip);
    s.set_pixel(1, 1, Rgba8::WHITE, clip);
    s.set_pixel(3, 3, Rgba8::WHITE, clip);
    assert_eq!(s.get_pixel(0, 0), Rgba8::TRANSPARENT);
    assert_eq!(s.get_pixel(1, 1), Rgba8::WHITE);
    assert_eq!(s.get_pixel(3, 3), Rgba8::TRANSPARENT);
}

#[test]
fn clear_fills_everything_and_export_is_straight() {
    let mut s = surface(2, 1);
    s.clear(Rgba8::new(255, 0, 0, 128));
    assert_eq!(s.data(), &[128, 0, 0, 128, 128, 0, 0, 128]);
    assert_eq!(s.to_rgba8_straight(), vec![255, 0, 0, 128, 255, 0, 0, 128]);
}
