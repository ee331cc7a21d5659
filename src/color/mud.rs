use crate::color::palette;
use crate::foundation::core::Rgba8;

/// A run of visible text drawn in one color.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ColorSpan {
    /// Visible text with codes removed.
    pub text: String,
    /// Straight RGBA color of the run.
    pub color: Rgba8,
}

enum Token {
    Literal(char),
    SetColor(Rgba8),
    Reset,
}

/// Split MUD-colored text into spans.
///
/// Text before the first code uses `default`. Malformed codes are kept as literal text.
pub fn colorize(text: &str, default: Rgba8) -> Vec<ColorSpan> {
    let mut spans: Vec<ColorSpan> = Vec::new();
    let mut color = default;
    let mut rest = text;
    while !rest.is_empty() {
        let (token, used) = next_token(rest);
        rest = &rest[used..];
        match token {
            Token::Literal(ch) => match spans.last_mut() {
                Some(last) if last.color == color => last.text.push(ch),
                _ => spans.push(ColorSpan {
                    text: ch.to_string(),
                    color,
                }),
            },
            Token::SetColor(c) => color = c,
            Token::Reset => color = default,
        }
    }
    spans
}

/// Remove every recognized code and return the visible text.
pub fn strip_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        let (token, used) = next_token(rest);
        rest = &rest[used..];
        if let Token::Literal(ch) = token {
            out.push(ch);
        }
    }
    out
}

/// Lex one token from the front of `s` (non-empty). Returns the token and its byte length.
fn next_token(s: &str) -> (Token, usize) {
    let first = s.chars().next().unwrap_or('$');
    if first != '$' {
        return (Token::Literal(first), first.len_utf8());
    }
    let body = &s[1..];
    let Some(code) = body.chars().next() else {
        return (Token::Literal('$'), 1);
    };
    match code {
        '$' => (Token::Literal('$'), 2),
        'n' => (Token::Reset, 2),
        'x' => match body.get(1..4) {
            Some(d) if d.bytes().all(|b| b.is_ascii_digit()) => match d.parse::<u8>() {
                Ok(i) => (Token::SetColor(palette::xterm256(i)), 5),
                Err(_) => (Token::Literal('$'), 1),
            },
            _ => (Token::Literal('$'), 1),
        },
        'X' => match body.get(1..7) {
            Some(h) if h.bytes().all(|b| b.is_ascii_hexdigit()) => {
                let byte = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).unwrap_or(0);
                (Token::SetColor(Rgba8::opaque(byte(0), byte(2), byte(4))), 8)
            }
            _ => (Token::Literal('$'), 1),
        },
        c => match palette::basic_letter(c) {
            Some(color) => (Token::SetColor(color), 2),
            None => (Token::Literal('$'), 1),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/mud.rs"]
mod tests;
