use super::*;

fn span(text: &str, color: Rgba8) -> ColorSpan {
    ColorSpan {
        text: text.to_string(),
        color,
    }
}

const RED: Rgba8 = Rgba8 {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};

#[test]
fn plain_text_is_one_default_span() {
    assert_eq!(
        colorize("hello", Rgba8::WHITE),
        vec![span("hello", Rgba8::WHITE)]
    );
    assert!(colorize("", Rgba8::WHITE).is_empty());
}

#[test]
fn basic_codes_switch_color_and_reset_returns_to_default() {
    let spans = colorize("a$Rb$nc", Rgba8::WHITE);
    assert_eq!(
        spans,
        vec![
            span("a", Rgba8::WHITE),
            span("b", RED),
            span("c", Rgba8::WHITE)
        ]
    );
}

#[test]
fn xterm_and_truecolor_codes() {
    let spans = colorize("$x196hot$X0000ffcold", Rgba8::WHITE);
    assert_eq!(
        spans,
        vec![span("hot", RED), span("cold", Rgba8::opaque(0, 0, 255))]
    );
}

#[test]
fn empty_spans_are_dropped_and_same_color_runs_merge() {
    let spans = colorize("$G$Rab$Rcd", Rgba8::WHITE);
    assert_eq!(spans, vec![span("abcd", RED)]);
}

#[test]
fn malformed_codes_pass_through_as_literal_text() {
    assert_eq!(
        colorize("cost $5 $x12 $Xzz", Rgba8::WHITE),
        vec![span("cost $5 $x12 $Xzz", Rgba8::WHITE)]
    );
    assert_eq!(
        colorize("trailing $", Rgba8::WHITE),
        vec![span("trailing $", Rgba8::WHITE)]
    );
}

#[test]
fn doubled_dollar_is_literal() {
    assert_eq!(
        colorize("$$R", Rgba8::WHITE),
        vec![span("$R", Rgba8::WHITE)]
    );
}

#[test]
fn strip_codes_keeps_only_visible_text() {
    assert_eq!(strip_codes("$Rred$n and $x021blue$$"), "red and blue$");
    assert_eq!(strip_codes("naïve $Gcafé"), "naïve café");
}
