//! Font lookup, substitution and glyph metrics.
//!
//! Decks name typefaces of the authoring platform (Calibri, Cambria, ...)
//! that are often absent locally. A [`FontSubstitution`] policy turns one
//! requested family into an ordered candidate list; [`FontBook`] queries
//! fontdb with those candidates and hands out parsed ttf-parser faces.

use super::tree::TextFont;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use std::collections::HashMap;
use ttf_parser::{Face, OutlineBuilder};

/// Width of a glyph the font cannot measure, as a fraction of the size.
pub(crate) const FALLBACK_ADVANCE_RATIO: f64 = 0.5;

/// Broad family used when no named candidate is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericFamily {
    SansSerif,
    Serif,
    Monospace,
}

impl GenericFamily {
    fn to_fontdb(self) -> Family<'static> {
        match self {
            GenericFamily::SansSerif => Family::SansSerif,
            GenericFamily::Serif => Family::Serif,
            GenericFamily::Monospace => Family::Monospace,
        }
    }
}

/// Maps a requested typeface to local candidates.
pub trait FontSubstitution: Send + Sync {
    /// Candidate family names in preference order, the requested name first.
    fn candidates(&self, family: &str) -> Vec<String>;

    /// Generic family tried after every named candidate.
    fn generic(&self, family: &str) -> GenericFamily;
}

/// Mapping table plus a name-based heuristic.
#[derive(Debug, Clone)]
pub struct DefaultFontSubstitution {
    table: HashMap<String, Vec<String>>,
}

impl Default for DefaultFontSubstitution {
    fn default() -> Self {
        let mut substitution = Self {
            table: HashMap::new(),
        };
        // Metric-compatible replacements first
        for (from, to) in [
            ("Calibri", &["Carlito", "Liberation Sans", "Arial"][..]),
            ("Calibri Light", &["Carlito", "Liberation Sans", "Arial"][..]),
            ("Cambria", &["Caladea", "Liberation Serif", "Times New Roman"][..]),
            ("Arial", &["Liberation Sans", "Arimo", "Helvetica"][..]),
            ("Helvetica", &["Liberation Sans", "Arial"][..]),
            ("Times New Roman", &["Liberation Serif", "Tinos", "Times"][..]),
            ("Courier New", &["Liberation Mono", "Cousine", "Courier"][..]),
            ("Segoe UI", &["Noto Sans", "DejaVu Sans", "Arial"][..]),
            ("Verdana", &["DejaVu Sans"][..]),
            ("Consolas", &["Inconsolata", "DejaVu Sans Mono"][..]),
            ("Georgia", &["Gelasio", "DejaVu Serif"][..]),
        ] {
            substitution = substitution.with_mapping(from, to.iter().copied());
        }
        substitution
    }
}

impl DefaultFontSubstitution {
    /// Empty table; only the heuristic applies.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Add or replace the candidates for `family`.
    pub fn with_mapping<I, S>(mut self, family: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table.insert(
            family.to_ascii_lowercase(),
            candidates.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl FontSubstitution for DefaultFontSubstitution {
    fn candidates(&self, family: &str) -> Vec<String> {
        let mut candidates = vec![family.to_string()];
        if let Some(mapped) = self.table.get(&family.to_ascii_lowercase()) {
            candidates.extend(mapped.iter().cloned());
        }
        candidates
    }

    fn generic(&self, family: &str) -> GenericFamily {
        let lower = family.to_ascii_lowercase();
        if ["mono", "courier", "consol", "code"]
            .iter()
            .any(|k| lower.contains(k))
        {
            GenericFamily::Monospace
        } else if ["times", "serif", "georgia", "cambria", "garamond", "roman", "book"]
            .iter()
            .any(|k| lower.contains(k) && !lower.contains("sans"))
        {
            GenericFamily::Serif
        } else {
            GenericFamily::SansSerif
        }
    }
}

/// Installed fonts plus the substitution policy.
pub struct FontBook {
    db: Database,
    substitution: Box<dyn FontSubstitution>,
}

impl FontBook {
    /// Font book over the system fonts.
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!(faces = db.len(); "Loaded system fonts");
        Self::from_database(db)
    }

    /// Font book without any fonts; text measures with the fallback advance
    /// and draws nothing.
    pub fn empty() -> Self {
        Self::from_database(Database::new())
    }

    fn from_database(db: Database) -> Self {
        Self {
            db,
            substitution: Box::new(DefaultFontSubstitution::default()),
        }
    }

    /// Replace the substitution policy.
    pub fn with_substitution(mut self, substitution: impl FontSubstitution + 'static) -> Self {
        self.substitution = Box::new(substitution);
        self
    }

    /// Register font file bytes (TTF/OTF/TTC).
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }

    /// Number of faces known to the book.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn query(&self, font: &TextFont) -> Option<fontdb::ID> {
        let names = self.substitution.candidates(&font.family);
        let mut families: Vec<Family<'_>> = names.iter().map(|n| Family::Name(n.as_str())).collect();
        families.push(self.substitution.generic(&font.family).to_fontdb());

        let query = Query {
            families: &families,
            weight: if font.bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: if font.italic { Style::Italic } else { Style::Normal },
        };
        let id = self.db.query(&query);
        if id.is_none() {
            log::trace!(family = font.family.as_str(); "No installed face matches");
        }
        id
    }

    /// Run `f` with the best face for `font`; `None` when nothing matches or
    /// the face fails to parse.
    pub fn with_face<R>(&self, font: &TextFont, f: impl FnOnce(&Face<'_>) -> R) -> Option<R> {
        let id = self.query(font)?;
        self.db
            .with_face_data(id, |data, index| {
                Face::parse(data, index).ok().map(|face| f(&face))
            })
            .flatten()
    }

    /// Advance width of `text` in points.
    pub fn measure(&self, text: &str, font: &TextFont) -> f64 {
        self.with_face(font, |face| measure_with_face(face, text, font.size))
            .unwrap_or_else(|| fallback_width(text, font.size))
    }
}

/// Advance-width measurement used by text layout.
pub trait TextMeasure: Send + Sync {
    /// Advance width of `text` in points.
    fn measure(&self, text: &str, font: &TextFont) -> f64;
}

impl TextMeasure for FontBook {
    fn measure(&self, text: &str, font: &TextFont) -> f64 {
        FontBook::measure(self, text, font)
    }
}

/// Half an em per character: what text measures at without fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMeasure;

impl TextMeasure for FallbackMeasure {
    fn measure(&self, text: &str, font: &TextFont) -> f64 {
        fallback_width(text, font.size)
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook").field("faces", &self.db.len()).finish()
    }
}

/// Width estimate without a font.
pub(crate) fn fallback_width(text: &str, size: f64) -> f64 {
    text.chars().filter(|c| *c != '\n').count() as f64 * size * FALLBACK_ADVANCE_RATIO
}

pub(crate) fn measure_with_face(face: &Face<'_>, text: &str, size: f64) -> f64 {
    let scale = size / f64::from(face.units_per_em().max(1));
    text.chars()
        .filter(|c| *c != '\n')
        .map(|c| {
            face.glyph_index(c)
                .and_then(|g| face.glyph_hor_advance(g))
                .map(|advance| f64::from(advance) * scale)
                .unwrap_or(size * FALLBACK_ADVANCE_RATIO)
        })
        .sum()
}

/// Collects glyph outlines into a tiny-skia path, converting from font
/// units (Y up, origin on the baseline) to slide points (Y down).
pub(crate) struct GlyphPathBuilder {
    builder: tiny_skia::PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    pub(crate) fn new(origin_x: f64, baseline: f64, scale: f64) -> Self {
        Self {
            builder: tiny_skia::PathBuilder::new(),
            origin_x: origin_x as f32,
            baseline: baseline as f32,
            scale: scale as f32,
        }
    }

    pub(crate) fn set_origin_x(&mut self, origin_x: f64) {
        self.origin_x = origin_x as f32;
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }

    pub(crate) fn finish(self) -> Option<tiny_skia::Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
