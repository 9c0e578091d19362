//! Fixed-metric bitmap fonts
//!
//! A `FontMetrics` is an immutable glyph table: every character maps to an
//! advance width, its ascent/descent and a 1-bit bitmap. Tables are built
//! once at startup (from the built-in mono fonts or from BDF files) and
//! shared read-only as `Arc<FontMetrics>`.

use crate::bdf;
use crate::errors::FontLoadError;
use embedded_graphics::{
    mono_font::{ascii, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

/// Face used when a configured face name is unknown
pub const DEFAULT_FACE: &str = "6x10";

/// Built-in faces, all covering printable ASCII
static BUILTIN_FACES: &[(&str, &MonoFont<'static>)] = &[
    ("4x6", &ascii::FONT_4X6),
    ("5x7", &ascii::FONT_5X7),
    ("5x8", &ascii::FONT_5X8),
    ("6x9", &ascii::FONT_6X9),
    ("6x10", &ascii::FONT_6X10),
    ("6x12", &ascii::FONT_6X12),
    ("6x13", &ascii::FONT_6X13),
    ("7x13", &ascii::FONT_7X13),
    ("7x14", &ascii::FONT_7X14),
    ("8x13", &ascii::FONT_8X13),
    ("9x15", &ascii::FONT_9X15),
    ("10x20", &ascii::FONT_10X20),
];

/// Converted built-in faces, shared by every FontBook
static BUILTIN_CACHE: Lazy<HashMap<&'static str, Arc<FontMetrics>>> = Lazy::new(|| {
    BUILTIN_FACES
        .iter()
        .map(|(name, font)| (*name, Arc::new(FontMetrics::from_mono_font(name, font))))
        .collect()
});

/// Per-character metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharMetrics {
    pub advance: u32,
    pub ascent: u32,
    pub descent: u32,
}

/// A single glyph bitmap.
///
/// `top` is the offset of the first bitmap row from the baseline
/// (negative = above the baseline), `x_offset` the offset of the first
/// column from the pen position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub advance: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub top: i32,
    bits: Vec<bool>,
}

impl Glyph {
    pub fn new(
        advance: u32,
        width: u32,
        height: u32,
        x_offset: i32,
        top: i32,
        bits: Vec<bool>,
    ) -> Self {
        let mut bits = bits;
        bits.resize((width * height) as usize, false);
        Self {
            advance,
            width,
            height,
            x_offset,
            top,
            bits,
        }
    }

    /// A glyph with no lit pixels (e.g. space)
    pub fn blank(advance: u32) -> Self {
        Self::new(advance, 0, 0, 0, 0, Vec::new())
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    /// Lit pixels relative to (pen x, baseline y)
    pub fn lit_pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| {
                self.is_set(x, y)
                    .then(|| (self.x_offset + x as i32, self.top + y as i32))
            })
        })
    }

    fn ascent(&self) -> u32 {
        (-self.top).max(0) as u32
    }

    fn descent(&self) -> u32 {
        (self.top + self.height as i32).max(0) as u32
    }
}

/// Immutable glyph table for one bitmap font face
#[derive(Debug, Clone)]
pub struct FontMetrics {
    name: String,
    ascent: u32,
    descent: u32,
    average_advance: u32,
    glyphs: HashMap<char, Glyph>,
}

impl FontMetrics {
    /// Build a face from its glyphs. `ascent`/`descent` are the face-wide
    /// line metrics; the line box height is their sum.
    pub fn from_glyphs(
        name: impl Into<String>,
        ascent: u32,
        descent: u32,
        glyphs: HashMap<char, Glyph>,
    ) -> Self {
        let average_advance = if glyphs.is_empty() {
            1
        } else {
            let total: u64 = glyphs.values().map(|g| g.advance as u64).sum();
            ((total as f64 / glyphs.len() as f64).round() as u32).max(1)
        };
        Self {
            name: name.into(),
            ascent,
            descent,
            average_advance,
            glyphs,
        }
    }

    /// Convert an embedded-graphics mono font by rasterizing every printable
    /// ASCII character into a glyph bitmap
    pub fn from_mono_font(name: &str, font: &MonoFont<'_>) -> Self {
        let size = font.character_size;
        let advance = size.width + font.character_spacing;
        let baseline = font.baseline.min(size.height);
        let style = MonoTextStyle::new(font, BinaryColor::On);

        let mut glyphs = HashMap::with_capacity(95);
        for c in ' '..='~' {
            let mut cell = GlyphCell::new(size);
            let mut buf = [0u8; 4];
            let text = c.encode_utf8(&mut buf);
            // GlyphCell never fails
            let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut cell);
            glyphs.insert(
                c,
                Glyph::new(advance, size.width, size.height, 0, -(baseline as i32), cell.bits),
            );
        }

        Self::from_glyphs(name, baseline, size.height - baseline, glyphs)
    }

    /// Parse a BDF font
    pub fn from_bdf(name: impl Into<String>, source: &str) -> Result<Self, FontLoadError> {
        let parsed = bdf::parse(source)?;
        Ok(Self::from_glyphs(name, parsed.ascent, parsed.descent, parsed.glyphs))
    }

    /// Read and parse a BDF font file
    pub fn load_bdf_file(name: impl Into<String>, path: &Path) -> Result<Self, FontLoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| FontLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bdf(name, &source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line box height in pixels
    pub fn height(&self) -> u32 {
        self.ascent + self.descent
    }

    pub fn ascent(&self) -> u32 {
        self.ascent
    }

    pub fn descent(&self) -> u32 {
        self.descent
    }

    /// Mean advance over all glyphs; the width substituted for unmapped
    /// characters during layout
    pub fn average_advance(&self) -> u32 {
        self.average_advance
    }

    pub fn has_glyph(&self, c: char) -> bool {
        self.glyphs.contains_key(&c)
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    pub fn advance_of(&self, c: char) -> Result<u32, FontLoadError> {
        self.glyphs
            .get(&c)
            .map(|g| g.advance)
            .ok_or(FontLoadError::MissingGlyph(c))
    }

    pub fn char_metrics(&self, c: char) -> Result<CharMetrics, FontLoadError> {
        let glyph = self.glyphs.get(&c).ok_or(FontLoadError::MissingGlyph(c))?;
        Ok(CharMetrics {
            advance: glyph.advance,
            ascent: glyph.ascent(),
            descent: glyph.descent(),
        })
    }

    /// Strict width: fails on the first unmapped character
    pub fn width_of(&self, text: &str) -> Result<u32, FontLoadError> {
        text.chars().map(|c| self.advance_of(c)).sum()
    }

    /// Advance for `c`, or the average advance when the face lacks it
    pub fn advance_or_fallback(&self, c: char) -> u32 {
        self.advance_of(c).unwrap_or(self.average_advance)
    }
}

/// Scratch target a single mono glyph is drawn into
struct GlyphCell {
    size: Size,
    bits: Vec<bool>,
}

impl GlyphCell {
    fn new(size: Size) -> Self {
        Self {
            size,
            bits: vec![false; (size.width * size.height) as usize],
        }
    }
}

impl OriginDimensions for GlyphCell {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for GlyphCell {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color.is_on()
                && point.x >= 0
                && point.y >= 0
                && (point.x as u32) < self.size.width
                && (point.y as u32) < self.size.height
            {
                self.bits[(point.y as u32 * self.size.width + point.x as u32) as usize] = true;
            }
        }
        Ok(())
    }
}

/// Named font faces available to providers
#[derive(Debug, Clone)]
pub struct FontBook {
    faces: HashMap<String, Arc<FontMetrics>>,
    fallback: Arc<FontMetrics>,
}

impl FontBook {
    /// A book holding only the built-in faces
    pub fn with_builtin() -> Self {
        let faces: HashMap<String, Arc<FontMetrics>> = BUILTIN_CACHE
            .iter()
            .map(|(name, face)| (name.to_string(), Arc::clone(face)))
            .collect();
        let fallback = faces
            .get(DEFAULT_FACE)
            .cloned()
            .unwrap_or_else(|| {
                Arc::new(FontMetrics::from_mono_font(DEFAULT_FACE, &ascii::FONT_6X10))
            });
        Self { faces, fallback }
    }

    /// Add or replace a face
    pub fn insert(&mut self, face: FontMetrics) {
        debug!("Registered font face '{}' (height {})", face.name(), face.height());
        self.faces.insert(face.name().to_string(), Arc::new(face));
    }

    /// Load a BDF file under the given face name
    pub fn load_bdf_file(&mut self, name: &str, path: &Path) -> Result<(), FontLoadError> {
        let face = FontMetrics::load_bdf_file(name, path)?;
        self.insert(face);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<FontMetrics>, FontLoadError> {
        self.faces
            .get(name)
            .cloned()
            .ok_or_else(|| FontLoadError::UnknownFace(name.to_string()))
    }

    /// Look up a face, falling back to the default face with a warning
    pub fn get_or_default(&self, name: &str) -> Arc<FontMetrics> {
        match self.get(name) {
            Ok(face) => face,
            Err(e) => {
                warn!("{}; using '{}'", e, self.fallback.name());
                Arc::clone(&self.fallback)
            }
        }
    }

    pub fn default_face(&self) -> Arc<FontMetrics> {
        Arc::clone(&self.fallback)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.faces.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::with_builtin()
    }
}
