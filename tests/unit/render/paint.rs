use super::*;

const RED: Rgba8 = Rgba8::opaque(255, 0, 0);
const BLUE: Rgba8 = Rgba8::opaque(0, 0, 255);

fn checker_2x1() -> DecodedImage {
    DecodedImage {
        width: 2,
        height: 1,
        rgba8_premul: vec![255, 0, 0, 255, 0, 0, 255, 255],
    }
}

fn image_paint(img: &DecodedImage, bilinear: bool) -> Paint<'_> {
    Paint::Image(ImagePaint {
        image: img,
        inverse: Affine::IDENTITY,
        src: Rect::new(0.0, 0.0, f64::from(img.width), f64::from(img.height)),
        alpha: 1.0,
        tint: None,
        bilinear,
    })
}

#[test]
fn horizontal_gradient_runs_left_to_right() {
    let paint = Paint::Linear {
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        from: RED,
        to: BLUE,
        direction: GradientDirection::Horizontal,
    };
    let left = paint.sample(0, 5);
    let right = paint.sample(9, 5);
    assert!(left[0] > 200 && left[2] < 50);
    assert!(right[2] > 200 && right[0] < 50);
    assert_eq!(paint.sample(0, 0), paint.sample(0, 9));
}

#[test]
fn vertical_and_diagonal_gradients() {
    let v = Paint::Linear {
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        from: RED,
        to: BLUE,
        direction: GradientDirection::Vertical,
    };
    assert_eq!(v.sample(0, 3), v.sample(9, 3));

    let d = Paint::Linear {
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        from: RED,
        to: BLUE,
        direction: GradientDirection::Diagonal,
    };
    assert_eq!(d.sample(2, 7), d.sample(7, 2));
    assert!(d.sample(0, 0)[0] > d.sample(9, 9)[0]);
}

#[test]
fn radial_gradient_center_is_inner_color() {
    let paint = Paint::Radial {
        center: Point::new(5.0, 5.0),
        radius: 5.0,
        inner: Rgba8::WHITE,
        outer: Rgba8::BLACK,
    };
    assert!(paint.sample(4, 4)[0] > 200);
    assert!(paint.sample(0, 5)[0] < 60);
}

#[test]
fn nearest_sampling_picks_texels() {
    let img = checker_2x1();
    let paint = image_paint(&img, false);
    assert_eq!(paint.sample(0, 0), [255, 0, 0, 255]);
    assert_eq!(paint.sample(1, 0), [0, 0, 255, 255]);
    // Clamped to the image edge.
    assert_eq!(paint.sample(7, 0), [0, 0, 255, 255]);
}

#[test]
fn bilinear_sampling_at_texel_centers_matches_nearest() {
    let img = checker_2x1();
    let paint = image_paint(&img, true);
    assert_eq!(paint.sample(0, 0), [255, 0, 0, 255]);
    assert_eq!(paint.sample(1, 0), [0, 0, 255, 255]);
}

#[test]
fn alpha_and_tint_scale_the_sample() {
    let img = DecodedImage {
        width: 1,
        height: 1,
        rgba8_premul: vec![255, 255, 255, 255],
    };
    let paint = Paint::Image(ImagePaint {
        image: &img,
        inverse: Affine::IDENTITY,
        src: Rect::new(0.0, 0.0, 1.0, 1.0),
        alpha: 0.5,
        tint: Some(Rgba8::opaque(255, 0, 0)),
        bilinear: false,
    });
    assert_eq!(paint.sample(0, 0), [128, 0, 0, 128]);
}

#[test]
fn direction_names_parse() {
    assert_eq!(
        "Diagonal".parse::<GradientDirection>().unwrap(),
        GradientDirection::Diagonal
    );
    assert!("radial".parse::<GradientDirection>().is_err());
}
