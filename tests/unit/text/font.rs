use super::*;

#[test]
fn size_and_single_family() {
    let f = FontSpec::parse("14px monospace").unwrap();
    assert_eq!(f.size_px, 14.0);
    assert_eq!(f.families, vec![FontFamily::Monospace]);
    assert_eq!(f.weight, 400);
    assert_eq!(f.slant, FontSlant::Normal);
}

#[test]
fn modifiers_before_size() {
    let f = FontSpec::parse("italic small-caps bold 12.5px Arial").unwrap();
    assert_eq!(f.slant, FontSlant::Italic);
    assert!(f.small_caps);
    assert_eq!(f.weight, 700);
    assert_eq!(f.size_px, 12.5);
    assert_eq!(f.families, vec![FontFamily::Named("Arial".into())]);
}

#[test]
fn family_list_with_quotes_and_spaces() {
    let f = FontSpec::parse("300 16px \"DejaVu Sans\", 'Noto Sans', sans-serif").unwrap();
    assert_eq!(f.weight, 300);
    assert_eq!(
        f.families,
        vec![
            FontFamily::Named("DejaVu Sans".into()),
            FontFamily::Named("Noto Sans".into()),
            FontFamily::SansSerif,
        ]
    );
}

#[test]
fn points_and_line_height_suffix() {
    assert_eq!(FontSpec::parse("12pt serif").unwrap().size_px, 16.0);
    assert_eq!(FontSpec::parse("20px/1.5 serif").unwrap().size_px, 20.0);
}

#[test]
fn missing_family_defaults_to_sans_serif() {
    let f: FontSpec = "10px".parse().unwrap();
    assert_eq!(f.families, vec![FontFamily::SansSerif]);
}

#[test]
fn rejects_missing_size_and_unknown_modifiers() {
    assert!(matches!(
        FontSpec::parse("bold Arial"),
        Err(CanvasError::Validation(_))
    ));
    assert!(FontSpec::parse("wobbly 12px Arial").is_err());
    assert!(FontSpec::parse("0px Arial").is_err());
}
