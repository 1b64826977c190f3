//! An extracted bitmap font: glyph rasters plus shared metrics.

use crate::bitmap::GlyphBitmap;

/// A set of glyph rasters covering a contiguous codepoint range.
///
/// Produced by an extractor and treated as read only by downstream
/// stages; a transformer that wants different rasters builds its own
/// and replaces the whole font.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitmapFont {
    /// Human readable family name, or the input file stem.
    pub name: String,
    /// First codepoint covered, inclusive.
    pub first_codepoint: u32,
    /// Last codepoint covered, inclusive.
    pub last_codepoint: u32,
    /// Pixel size the glyphs were rasterized at; zero when sliced from
    /// an image.
    pub pixel_size: u32,
    /// Widest glyph width, in pixels.
    pub cell_width: usize,
    /// Tallest glyph height, in pixels.
    pub cell_height: usize,
    pub glyphs: Vec<GlyphBitmap>,
}

impl BitmapFont {
    /// Looks up the glyph for a codepoint, if any.
    pub fn glyph(&self, codepoint: u32) -> Option<&GlyphBitmap> {
        self.glyphs.iter().find(|g| g.codepoint == codepoint)
    }

    /// Number of codepoints in the declared range.
    pub fn codepoint_count(&self) -> usize {
        if self.last_codepoint < self.first_codepoint {
            return 0;
        }
        (self.last_codepoint - self.first_codepoint + 1) as usize
    }

    /// Recomputes `cell_width`/`cell_height` from the glyphs.
    pub fn update_cell_metrics(&mut self) {
        self.cell_width = self.glyphs.iter().map(|g| g.width).max().unwrap_or(0);
        self.cell_height = self.glyphs.iter().map(|g| g.height).max().unwrap_or(0);
    }
}
