//! Rebuilds glyph rasters from a container stream payload.
//!
//! The inverse of the tiny transformer: each tiny record's move
//! program is replayed onto a fresh raster. Bitmap records are copied
//! through as packed rows.

use crate::params::Params;
use crate::pipeline::{Error, Font, Payload, Transformer};
use crate::stream::{FontStream, GlyphRecord, CLASS_BITMAP, CLASS_TINY};
use teikna::bitmap::{stride_for_width, GlyphBitmap};
use teikna::font::BitmapFont;
use teikna::tiny;

pub struct RasterTransformer;

fn decode_record(codepoint: u32, record: &GlyphRecord) -> Result<GlyphBitmap, Error> {
    let mut glyph = match record.class {
        CLASS_TINY => tiny::rasterize(codepoint, record.width, record.height, &record.payload)?,
        CLASS_BITMAP => {
            let stride = stride_for_width(record.width);
            let expected = stride * record.height;
            if record.payload.len() < expected {
                return Err(Error::InvalidFont(format!(
                    "bitmap record for codepoint {codepoint} is short: {} of {expected} bytes",
                    record.payload.len()
                )));
            }
            let mut glyph = GlyphBitmap::new(codepoint, record.width, record.height);
            glyph.data.copy_from_slice(&record.payload[..expected]);
            glyph
        }
        other => {
            return Err(Error::InvalidFont(format!(
                "unknown glyph class {other} for codepoint {codepoint}"
            )));
        }
    };
    glyph.bearing_y = glyph.height as i32;
    glyph.advance = glyph.width as i32;
    Ok(glyph)
}

impl Transformer for RasterTransformer {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn transform(&self, font: &mut Font, _params: &Params) -> Result<(), Error> {
        let Some(payload) = font.payload.take() else {
            return Err(Error::InvalidFont(
                "raster transform requires a stream payload".into(),
            ));
        };
        let stream = FontStream::parse(payload.bytes())?;

        let mut glyphs = Vec::with_capacity(stream.glyphs.len());
        for (i, record) in stream.glyphs.iter().enumerate() {
            let codepoint = u32::from(stream.first_codepoint) + i as u32;
            glyphs.push(decode_record(codepoint, record)?);
        }

        font.bitmap = BitmapFont {
            name: std::mem::take(&mut font.bitmap.name),
            first_codepoint: stream.first_codepoint.into(),
            last_codepoint: stream.last_codepoint.into(),
            pixel_size: 0,
            cell_width: stream.max_width,
            cell_height: stream.max_height,
            glyphs,
        };
        Ok(())
    }
}
