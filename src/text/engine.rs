use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use usvg::fontdb;

use crate::color::{ColorSpan, colorize};
use crate::foundation::config::CanvasSettings;
use crate::foundation::core::Rgba8;
use crate::text::font::{FontFamily, FontSlant, FontSpec};

/// Size of a laid-out text block in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct TextSize {
    /// Widest line advance.
    pub width: f64,
    /// Sum of line heights.
    pub height: f64,
}

/// Shaped text ready for glyph rasterization. The layout box starts at `(0, 0)`.
pub(crate) struct ShapedText {
    pub(crate) layout: parley::Layout<Rgba8>,
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) size: TextSize,
}

#[derive(Clone)]
struct LoadedFace {
    family: String,
    font: vello_cpu::peniko::FontData,
}

/// Font discovery plus Parley shaping.
///
/// Faces are found with `fontdb`, then registered with Parley on first use so that a
/// measured layout and a drawn layout always come from the same bytes.
pub struct TextEngine {
    db: fontdb::Database,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    faces: HashMap<fontdb::ID, LoadedFace>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new(true, &[])
    }
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("faces", &self.db.len())
            .field("loaded", &self.faces.len())
            .finish_non_exhaustive()
    }
}

impl TextEngine {
    /// Build a font database from system fonts (optional) and extra directories.
    pub fn new(system_fonts: bool, font_dirs: &[PathBuf]) -> Self {
        let mut db = fontdb::Database::new();
        if system_fonts {
            db.load_system_fonts();
        }
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self {
            db,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    /// Engine configured from [`CanvasSettings`].
    pub fn from_settings(settings: &CanvasSettings) -> Self {
        Self::new(settings.system_fonts, &settings.font_dirs)
    }

    /// Register font bytes supplied by the embedding application.
    pub fn add_font_bytes(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
    }

    /// Number of faces known to the database.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Measure MUD-colored `text` exactly as [`TextEngine::shape`] lays it out.
    pub fn measure(&mut self, text: &str, font: &FontSpec) -> TextSize {
        let spans = colorize(text, Rgba8::BLACK);
        self.shape(&spans, font).map(|s| s.size).unwrap_or_default()
    }

    /// Lay out colored spans. `None` when there is nothing to draw or no usable face.
    pub(crate) fn shape(&mut self, spans: &[ColorSpan], font: &FontSpec) -> Option<ShapedText> {
        let text: String = spans.iter().map(|s| s.text.as_str()).collect();
        if text.is_empty() {
            return None;
        }
        let Some(face) = self.resolve_face(font) else {
            tracing::debug!(families = ?font.families, "no font face available, skipping text");
            return None;
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(font.weight)),
        ));
        builder.push_default(parley::style::StyleProperty::FontStyle(match font.slant {
            FontSlant::Normal => parley::style::FontStyle::Normal,
            FontSlant::Italic => parley::style::FontStyle::Italic,
            FontSlant::Oblique => parley::style::FontStyle::Oblique(None),
        }));
        builder.push_default(parley::style::StyleProperty::Brush(Rgba8::BLACK));

        let mut start = 0;
        for span in spans {
            let end = start + span.text.len();
            builder.push(parley::style::StyleProperty::Brush(span.color), start..end);
            start = end;
        }

        let mut layout: parley::Layout<Rgba8> = builder.build(&text);
        layout.break_all_lines(None);

        let mut size = TextSize::default();
        for line in layout.lines() {
            let m = line.metrics();
            size.width = size.width.max(f64::from(m.advance));
            size.height += f64::from(m.ascent + m.descent + m.leading);
        }

        Some(ShapedText {
            layout,
            font: face.font,
            size,
        })
    }

    fn resolve_face(&mut self, font: &FontSpec) -> Option<LoadedFace> {
        let mut families: Vec<fontdb::Family<'_>> = font
            .families
            .iter()
            .map(|f| match f {
                FontFamily::Named(name) => fontdb::Family::Name(name.as_str()),
                FontFamily::Serif => fontdb::Family::Serif,
                FontFamily::SansSerif => fontdb::Family::SansSerif,
                FontFamily::Monospace => fontdb::Family::Monospace,
                FontFamily::Cursive => fontdb::Family::Cursive,
                FontFamily::Fantasy => fontdb::Family::Fantasy,
            })
            .collect();
        families.push(fontdb::Family::SansSerif);
        families.push(fontdb::Family::Serif);
        families.push(fontdb::Family::Monospace);

        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(font.weight),
            stretch: fontdb::Stretch::Normal,
            style: match font.slant {
                FontSlant::Normal => fontdb::Style::Normal,
                FontSlant::Italic => fontdb::Style::Italic,
                FontSlant::Oblique => fontdb::Style::Oblique,
            },
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;

        if let Some(face) = self.faces.get(&id) {
            return Some(face.clone());
        }

        let (bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = registered
            .iter()
            .find(|(_, infos)| infos.iter().any(|i| i.index() == index))
            .or_else(|| registered.first())
            .map(|(id, _)| *id)?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)?
            .to_string();

        let face = LoadedFace {
            family,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), index),
        };
        tracing::debug!(family = %face.family, index, "registered font face");
        self.faces.insert(id, face.clone());
        Some(face)
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_fonts_from_dir(db, &path);
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping font file");
        }
    }
}
