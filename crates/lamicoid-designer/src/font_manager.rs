//! Font metrics and glyph outlines for text layout.
//!
//! The serializer receives fonts through [`FontMetricsProvider`] rather than a
//! global registry. [`SystemFonts`] resolves faces from the installed system
//! fonts with `fontdb` and measures them with `rusttype`.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use lamicoid_core::units::pt_to_px;
use lamicoid_core::SerializeError;
use rusttype::{point as rt_point, Font, Scale};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::model::TextStyle;
use crate::svg_renderer::PathWriter;

/// Vertical metrics of a font at a given size, in editing pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Distance from the top of the line box to the baseline.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line box, positive.
    pub descent: f64,
    /// `ascent + descent`.
    pub height: f64,
    /// Baseline-to-baseline distance between consecutive lines.
    pub line_spacing: f64,
    /// Distance below the baseline at which underlines are drawn.
    pub underline_offset: f64,
}

/// Supplies measurements and outlines for styled text.
///
/// Coordinates are editing pixels with y pointing down.
pub trait FontMetricsProvider {
    fn metrics(&self, style: &TextStyle) -> Result<FontMetrics, SerializeError>;

    /// Horizontal advance of `text` laid out on one line.
    fn advance(&self, style: &TextStyle, text: &str) -> Result<f64, SerializeError>;

    /// Writes the glyph outlines of `text` with its baseline starting at `origin`.
    fn outline(
        &self,
        style: &TextStyle,
        text: &str,
        origin: (f64, f64),
        out: &mut PathWriter,
    ) -> Result<(), SerializeError>;
}

#[derive(Clone, Eq, PartialEq, Hash)]
struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Fonts installed on the system, loaded on first use and cached.
pub struct SystemFonts {
    db: Database,
    cache: Mutex<HashMap<FontKey, Arc<Font<'static>>>>,
}

impl SystemFonts {
    /// Scans the system font directories.
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} system font faces", db.len());
        Self::with_database(db)
    }

    /// No faces at all; for callers that never lay out text.
    pub fn empty() -> Self {
        Self::with_database(Database::new())
    }

    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Adds a font file to the searchable faces.
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        self.db.load_font_file(path)
    }

    pub fn list_font_families(&self) -> Vec<String> {
        let mut set = HashSet::new();
        for face in self.db.faces() {
            for (name, _) in &face.families {
                set.insert(name.clone());
            }
        }
        let mut out: Vec<_> = set.into_iter().collect();
        out.sort();
        out
    }

    fn font_for(&self, style: &TextStyle) -> Result<Arc<Font<'static>>, SerializeError> {
        let key = FontKey {
            family: style.font_family.clone(),
            bold: style.bold,
            italic: style.italic,
        };

        if let Some(font) = self
            .cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&key)
        {
            return Ok(Arc::clone(font));
        }

        let font = match self.load_font(&style.font_family, style.bold, style.italic) {
            Some(font) => font,
            None => {
                tracing::warn!(
                    "Font family '{}' not found, falling back to sans-serif",
                    style.font_family
                );
                self.load_font("", style.bold, style.italic)
                    .ok_or_else(|| SerializeError::FontUnavailable {
                        family: style.font_family.clone(),
                    })?
            }
        };

        let font = Arc::new(font);
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key, Arc::clone(&font));
        Ok(font)
    }

    fn load_font(&self, family: &str, bold: bool, italic: bool) -> Option<Font<'static>> {
        let families: Vec<Family<'_>> = match family.trim() {
            "" | "Sans" => vec![Family::SansSerif],
            "Serif" => vec![Family::Serif],
            "Monospace" => vec![Family::Monospace],
            other => vec![Family::Name(other)],
        };

        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: if italic { Style::Italic } else { Style::Normal },
        };

        let id = self.db.query(&query)?;
        let face = self.db.face(id)?;

        match &face.source {
            fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => {
                let bytes = fs::read(path).ok()?;
                Font::try_from_vec_and_index(bytes, face.index)
            }
            fontdb::Source::Binary(bytes) => {
                Font::try_from_vec_and_index(bytes.as_ref().as_ref().to_vec(), face.index)
            }
        }
    }
}

impl Default for SystemFonts {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale at which the font's em square spans the style's point size.
fn scale_for(font: &Font<'_>, style: &TextStyle) -> Scale {
    let em_px = pt_to_px(style.size_pt) as f32;
    let unscaled = font.v_metrics_unscaled();
    let units_per_em = f32::from(font.units_per_em().max(1));
    Scale::uniform(em_px * (unscaled.ascent - unscaled.descent) / units_per_em)
}

impl FontMetricsProvider for SystemFonts {
    fn metrics(&self, style: &TextStyle) -> Result<FontMetrics, SerializeError> {
        let font = self.font_for(style)?;
        let v = font.v_metrics(scale_for(&font, style));
        let ascent = f64::from(v.ascent);
        let descent = -f64::from(v.descent);
        Ok(FontMetrics {
            ascent,
            descent,
            height: ascent + descent,
            line_spacing: ascent + descent + f64::from(v.line_gap),
            underline_offset: descent / 2.0,
        })
    }

    fn advance(&self, style: &TextStyle, text: &str) -> Result<f64, SerializeError> {
        let font = self.font_for(style)?;
        let width = font
            .layout(text, scale_for(&font, style), rt_point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        Ok(f64::from(width))
    }

    fn outline(
        &self,
        style: &TextStyle,
        text: &str,
        origin: (f64, f64),
        out: &mut PathWriter,
    ) -> Result<(), SerializeError> {
        let font = self.font_for(style)?;
        let start = rt_point(origin.0 as f32, origin.1 as f32);
        for glyph in font.layout(text, scale_for(&font, style), start) {
            glyph.build_outline(out);
        }
        Ok(())
    }
}
