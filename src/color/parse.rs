use crate::color::{named, palette};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::math::unit_to_u8;

/// Parse color text into straight RGBA8.
///
/// Accepted forms: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)`, `rgba(r,g,b,a)`,
/// `hsl(h,s%,l%)`, `hsla(h,s%,l%,a)`, CSS color names and a single MUD code
/// (`$R`, `$x196`, `$Xff8800`).
pub fn parse_color(text: &str) -> CanvasResult<Rgba8> {
    let s = text.trim();
    let parsed = if let Some(hex) = s.strip_prefix('#') {
        parse_hex(hex)
    } else if s.starts_with('$') {
        parse_mud_code(s)
    } else if let Some((name, args)) = split_function(s) {
        parse_function(&name, args)
    } else {
        named::lookup(s)
    };
    parsed.ok_or_else(|| CanvasError::invalid_color(text))
}

/// Lenient form of [`parse_color`] used on every drawing path.
///
/// Unparsable text is logged and replaced by opaque black.
pub fn resolve_color(text: &str) -> Rgba8 {
    match parse_color(text) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to opaque black");
            Rgba8::BLACK
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |pair: &str| u8::from_str_radix(pair, 16).ok();
    let nibble = |i: usize| -> Option<u8> {
        let v = u8::from_str_radix(&hex[i..i + 1], 16).ok()?;
        Some(v * 17)
    };
    match hex.len() {
        3 => Some(Rgba8::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Rgba8::opaque(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
        )),
        8 => Some(Rgba8::new(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        )),
        _ => None,
    }
}

/// A whole-string MUD code. Inline codes inside text go through [`crate::colorize`].
fn parse_mud_code(s: &str) -> Option<Rgba8> {
    let body = s.strip_prefix('$')?;
    if let Some(digits) = body.strip_prefix('x') {
        if digits.len() == 3 && digits.chars().all(|c| c.is_ascii_digit()) {
            return digits.parse::<u8>().ok().map(palette::xterm256);
        }
        return None;
    }
    if let Some(hex) = body.strip_prefix('X') {
        return if hex.len() == 6 { parse_hex(hex) } else { None };
    }
    let mut chars = body.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    palette::basic_letter(c)
}

fn split_function(s: &str) -> Option<(String, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let name = s[..open].trim().to_ascii_lowercase();
    Some((name, inner))
}

fn parse_function(name: &str, args: &str) -> Option<Rgba8> {
    let parts: Vec<&str> = if args.contains(',') {
        args.split(',').map(str::trim).collect()
    } else {
        args.split_whitespace().collect()
    };
    match (name, parts.len()) {
        ("rgb" | "rgba", 3) => Some(Rgba8::opaque(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
        )),
        ("rgb" | "rgba", 4) => Some(Rgba8::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha(parts[3])?,
        )),
        ("hsl" | "hsla", 3 | 4) => {
            let h = parts[0].trim_end_matches("deg").trim().parse::<f32>().ok()?;
            let s = percent(parts[1])?;
            let l = percent(parts[2])?;
            let a = match parts.get(3) {
                Some(p) => alpha(p)?,
                None => 255,
            };
            if !h.is_finite() {
                return None;
            }
            let (r, g, b) = hsl_to_rgb(h, s, l);
            Some(Rgba8::new(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b), a))
        }
        _ => None,
    }
}

/// `0..=255` integer or `0%..=100%`.
fn channel(p: &str) -> Option<u8> {
    if let Some(pct) = p.strip_suffix('%') {
        let v = pct.trim().parse::<f32>().ok()?;
        if !(0.0..=100.0).contains(&v) {
            return None;
        }
        return Some(unit_to_u8(v / 100.0));
    }
    let v = p.parse::<f32>().ok()?;
    if !(0.0..=255.0).contains(&v) {
        return None;
    }
    Some(v.round() as u8)
}

/// `0..=1` float or `0%..=100%`.
fn alpha(p: &str) -> Option<u8> {
    let v = match p.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
        None => p.parse::<f32>().ok()?,
    };
    if !(0.0..=1.0).contains(&v) {
        return None;
    }
    Some(unit_to_u8(v))
}

fn percent(p: &str) -> Option<f32> {
    let v = p.strip_suffix('%')?.trim().parse::<f32>().ok()?;
    if !(0.0..=100.0).contains(&v) {
        return None;
    }
    Some(v / 100.0)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/color/parse.rs"]
mod tests;
