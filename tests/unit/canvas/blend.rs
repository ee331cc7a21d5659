use super::*;

fn one(dst: [u8; 4], src: [u8; 4], mode: BlendMode) -> [u8; 4] {
    let mut d = dst;
    composite_row(&mut d, &src, mode);
    d
}

#[test]
fn names_round_trip_through_from_str() {
    for mode in BlendMode::ALL {
        assert_eq!(mode.as_str().parse::<BlendMode>().unwrap(), mode);
    }
    assert_eq!(
        "Color_Dodge".parse::<BlendMode>().unwrap(),
        BlendMode::ColorDodge
    );
    assert!("plus-lighter".parse::<BlendMode>().is_err());
}

#[test]
fn normal_opaque_source_replaces_destination() {
    assert_eq!(
        one([0, 0, 255, 255], [255, 0, 0, 255], BlendMode::Normal),
        [255, 0, 0, 255]
    );
}

#[test]
fn normal_half_alpha_over_opaque() {
    let out = one([0, 0, 255, 255], [128, 0, 0, 128], BlendMode::Normal);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert_eq!(out[2], 127);
}

#[test]
fn transparent_source_leaves_destination() {
    for mode in BlendMode::ALL {
        assert_eq!(one([10, 20, 30, 255], [0, 0, 0, 0], mode), [10, 20, 30, 255]);
    }
}

#[test]
fn multiply_with_white_is_identity_and_black_is_black() {
    assert_eq!(
        one([200, 100, 50, 255], [255, 255, 255, 255], BlendMode::Multiply),
        [200, 100, 50, 255]
    );
    assert_eq!(
        one([200, 100, 50, 255], [0, 0, 0, 255], BlendMode::Multiply),
        [0, 0, 0, 255]
    );
}

#[test]
fn screen_darken_lighten_difference_on_opaque_pixels() {
    let d = [51, 204, 0, 255];
    let s = [204, 51, 255, 255];
    assert_eq!(one(d, s, BlendMode::Darken), [51, 51, 0, 255]);
    assert_eq!(one(d, s, BlendMode::Lighten), [204, 204, 255, 255]);
    assert_eq!(one(d, s, BlendMode::Difference), [153, 153, 255, 255]);
    assert_eq!(one(d, s, BlendMode::Screen), [214, 214, 255, 255]);
}

#[test]
fn blend_onto_transparent_destination_is_the_source() {
    for mode in BlendMode::ALL {
        assert_eq!(one([0, 0, 0, 0], [90, 60, 30, 255], mode), [90, 60, 30, 255]);
    }
}

#[test]
fn every_mode_on_opaque_pixels() {
    let d = [51, 204, 0, 255];
    let s = [204, 51, 255, 255];
    let expected = [
        (BlendMode::Normal, [204, 51, 255]),
        (BlendMode::Multiply, [41, 41, 0]),
        (BlendMode::Screen, [214, 214, 255]),
        (BlendMode::Overlay, [82, 173, 0]),
        (BlendMode::Darken, [51, 51, 0]),
        (BlendMode::Lighten, [204, 204, 255]),
        (BlendMode::ColorDodge, [255, 255, 0]),
        (BlendMode::ColorBurn, [0, 0, 0]),
        (BlendMode::HardLight, [173, 82, 255]),
        (BlendMode::SoftLight, [89, 180, 0]),
        (BlendMode::Difference, [153, 153, 255]),
        (BlendMode::Exclusion, [173, 173, 255]),
    ];
    assert_eq!(expected.len(), BlendMode::ALL.len());
    for (mode, [r, g, b]) in expected {
        assert_eq!(one(d, s, mode), [r, g, b, 255], "{mode:?}");
    }
}
