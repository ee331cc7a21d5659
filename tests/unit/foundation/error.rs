use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CanvasError::unknown_widget("map")
            .to_string()
            .contains("unknown widget 'map'")
    );
    assert!(
        CanvasError::invalid_color("#zz")
            .to_string()
            .contains("invalid color format:")
    );
    assert!(
        CanvasError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CanvasError::image_load("a.png", "missing")
            .to_string()
            .contains("image load error for 'a.png': missing")
    );
}

#[test]
fn batch_errors_name_the_widget() {
    assert_eq!(
        CanvasError::AlreadyBatching("hud".to_string()).to_string(),
        "widget 'hud' is already batching"
    );
    assert_eq!(
        CanvasError::NotBatching("hud".to_string()).to_string(),
        "widget 'hud' is not batching"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CanvasError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
