//! Extractors: stages that build a [`Font`](crate::pipeline::Font)
//! from an input file.

pub mod image;
pub mod tinybin;
pub mod ttf;

use crate::params::Params;
use crate::pipeline::Error;
use teikna::bitmap::GlyphBitmap;

/// The `input` parameter every extractor requires.
pub(crate) fn input_path(params: &Params) -> Result<&str, Error> {
    match params.get("input") {
        Some(path) if !path.is_empty() => Ok(path),
        _ => Err(Error::MissingInput),
    }
}

/// `first_ascii`/`last_ascii` with the printable ASCII default range.
pub(crate) fn codepoint_range(params: &Params) -> Result<(u8, u8), Error> {
    let first = params.get_int("first_ascii")?.unwrap_or(32);
    let last = params.get_int("last_ascii")?.unwrap_or(126);
    if first < 0 || last < first || last > 255 {
        return Err(Error::InvalidParameter(format!(
            "invalid codepoint range {first}..{last}"
        )));
    }
    Ok((first as u8, last as u8))
}

/// Trims a glyph to its rightmost set column and repacks the rows to
/// the narrower stride. Bearings and advance are preserved; an all
/// blank glyph ends up zero wide.
pub(crate) fn trim_proportional(glyph: &mut GlyphBitmap) {
    let new_width = (glyph.rightmost_set_bit() + 1).max(0) as usize;
    if new_width == glyph.width {
        return;
    }
    let mut packed = GlyphBitmap::new(glyph.codepoint, new_width, glyph.height);
    for y in 0..glyph.height {
        for x in 0..new_width {
            if glyph.bit(x, y) {
                packed.set_bit(x, y);
            }
        }
    }
    packed.bearing_x = glyph.bearing_x;
    packed.bearing_y = glyph.bearing_y;
    packed.advance = glyph.advance;
    *glyph = packed;
}
