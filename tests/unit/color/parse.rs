use super::*;

#[test]
fn parses_hex_short_long_and_alpha() {
    assert_eq!(parse_color("#f00").unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(parse_color("#FF8800").unwrap(), Rgba8::opaque(255, 136, 0));
    assert_eq!(
        parse_color("#0000ff80").unwrap(),
        Rgba8::new(0, 0, 255, 128)
    );
    assert!(parse_color("#12345").is_err());
    assert!(parse_color("#gg0000").is_err());
}

#[test]
fn parses_rgb_and_rgba_functions() {
    assert_eq!(
        parse_color("rgb(10, 20, 30)").unwrap(),
        Rgba8::opaque(10, 20, 30)
    );
    assert_eq!(
        parse_color("rgba(255,0,0,0.5)").unwrap(),
        Rgba8::new(255, 0, 0, 128)
    );
    assert_eq!(
        parse_color("RGB(100%, 0%, 50%)").unwrap(),
        Rgba8::opaque(255, 0, 128)
    );
    assert!(parse_color("rgb(256, 0, 0)").is_err());
    assert!(parse_color("rgba(0, 0, 0, 2)").is_err());
    assert!(parse_color("rgb(1, 2)").is_err());
}

#[test]
fn parses_hsl_pure_red_and_gray() {
    assert_eq!(
        parse_color("hsl(0, 100%, 50%)").unwrap(),
        Rgba8::opaque(255, 0, 0)
    );
    assert_eq!(
        parse_color("hsla(120deg, 0%, 50%, 1)").unwrap(),
        Rgba8::opaque(128, 128, 128)
    );
}

#[test]
fn parses_named_colors_with_whitespace() {
    assert_eq!(parse_color("  Red ").unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(parse_color("transparent").unwrap(), Rgba8::TRANSPARENT);
}

#[test]
fn parses_single_mud_codes() {
    assert_eq!(parse_color("$R").unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(parse_color("$x196").unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(parse_color("$Xff8800").unwrap(), Rgba8::opaque(255, 136, 0));
    assert!(parse_color("$x1").is_err());
    assert!(parse_color("$x999").is_err());
    assert!(parse_color("$Q").is_err());
}

#[test]
fn unknown_text_is_invalid_color_format() {
    let err = parse_color("blurple").unwrap_err();
    assert!(matches!(err, CanvasError::InvalidColorFormat(ref t) if t == "blurple"));
    assert!(parse_color("").is_err());
}

#[test]
fn resolve_color_falls_back_to_opaque_black() {
    assert_eq!(resolve_color("not a color"), Rgba8::BLACK);
    assert_eq!(resolve_color("lime"), Rgba8::opaque(0, 255, 0));
}
