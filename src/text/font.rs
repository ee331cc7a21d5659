use std::str::FromStr;

use crate::foundation::error::{CanvasError, CanvasResult};

/// Slant requested by a font descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSlant {
    /// Upright.
    #[default]
    Normal,
    /// Italic face.
    Italic,
    /// Oblique face, synthesized when the family has none.
    Oblique,
}

/// One entry of a descriptor's family list.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    /// A concrete family name such as `DejaVu Sans`.
    Named(String),
    /// Generic `serif`.
    Serif,
    /// Generic `sans-serif`.
    SansSerif,
    /// Generic `monospace`.
    Monospace,
    /// Generic `cursive`.
    Cursive,
    /// Generic `fantasy`.
    Fantasy,
}

impl FontFamily {
    fn parse(name: &str) -> Self {
        let trimmed = name.trim().trim_matches(|c| c == '"' || c == '\'');
        match trimmed.to_ascii_lowercase().as_str() {
            "serif" => Self::Serif,
            "sans-serif" | "sans" => Self::SansSerif,
            "monospace" | "mono" => Self::Monospace,
            "cursive" => Self::Cursive,
            "fantasy" => Self::Fantasy,
            _ => Self::Named(trimmed.to_string()),
        }
    }
}

/// Parsed `"[style] [variant] [weight] <size>px <family>[, <family>...]"` descriptor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    /// Requested slant.
    pub slant: FontSlant,
    /// `small-caps` was requested. Layout keeps normal glyphs.
    pub small_caps: bool,
    /// CSS weight, 1..=1000.
    pub weight: u16,
    /// Font size in pixels.
    pub size_px: f32,
    /// Families in preference order. Never empty.
    pub families: Vec<FontFamily>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            slant: FontSlant::Normal,
            small_caps: false,
            weight: 400,
            size_px: 14.0,
            families: vec![FontFamily::SansSerif],
        }
    }
}

impl FontSpec {
    /// Parse a CSS-like font descriptor.
    pub fn parse(text: &str) -> CanvasResult<Self> {
        let bad = |why: &str| CanvasError::validation(format!("font '{text}': {why}"));

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let size_idx = tokens
            .iter()
            .position(|t| parse_size(t).is_some())
            .ok_or_else(|| bad("missing <size>px"))?;

        let mut spec = FontSpec {
            size_px: parse_size(tokens[size_idx]).ok_or_else(|| bad("bad size"))?,
            ..FontSpec::default()
        };

        for modifier in &tokens[..size_idx] {
            match modifier.to_ascii_lowercase().as_str() {
                "normal" => {}
                "italic" => spec.slant = FontSlant::Italic,
                "oblique" => spec.slant = FontSlant::Oblique,
                "small-caps" => spec.small_caps = true,
                "bold" | "bolder" => spec.weight = 700,
                "lighter" => spec.weight = 300,
                other => match other.parse::<u16>() {
                    Ok(w) if (1..=1000).contains(&w) => spec.weight = w,
                    _ => return Err(bad(&format!("unknown modifier '{modifier}'"))),
                },
            }
        }

        let family_text = tokens[size_idx + 1..].join(" ");
        let families: Vec<FontFamily> = family_text
            .split(',')
            .filter(|f| !f.trim().is_empty())
            .map(FontFamily::parse)
            .collect();
        if !families.is_empty() {
            spec.families = families;
        }
        Ok(spec)
    }
}

impl FromStr for FontSpec {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `14px`, `10.5px`, `12pt` or `14px/1.2` (line height ignored).
fn parse_size(token: &str) -> Option<f32> {
    let token = token.split('/').next()?.to_ascii_lowercase();
    let (num, scale) = if let Some(n) = token.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = token.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else {
        return None;
    };
    let v = num.parse::<f32>().ok()? * scale;
    (v.is_finite() && v > 0.0).then_some(v)
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
