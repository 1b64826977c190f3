//! Serializes glyph rasters as packed row data in the container
//! stream.
//!
//! Glyphs are baseline aligned into a common cell: the cell height
//! spans from the tallest bearing down to the deepest descender, and
//! each glyph's rows land `max_bearing_y - bearing_y` rows from the
//! cell top. Fixed mode uses one cell width for every glyph;
//! proportional mode keeps each glyph's own width.

use crate::params::Params;
use crate::pipeline::{Error, Font, Payload, Transformer};
use crate::stream::{FontStream, GlyphRecord, CLASS_BITMAP};
use teikna::bitmap::{stride_for_width, GlyphBitmap};

pub struct BitmapTransformer;

fn pack_glyph_rows(
    glyph: Option<&GlyphBitmap>,
    cell_width: usize,
    cell_height: usize,
    max_bearing_y: i32,
) -> GlyphRecord {
    let stride = stride_for_width(cell_width);
    let mut record = GlyphRecord {
        class: CLASS_BITMAP,
        width: cell_width,
        height: cell_height,
        payload: Vec::new(),
    };
    if stride == 0 || cell_height == 0 {
        return record;
    }
    record.payload = vec![0; stride * cell_height];

    let Some(glyph) = glyph.filter(|g| g.is_well_formed()) else {
        return record;
    };

    let y_offset = max_bearing_y - glyph.bearing_y;
    for y in 0..glyph.height {
        let dst_y = y as i32 + y_offset;
        if dst_y < 0 || dst_y >= cell_height as i32 {
            continue;
        }
        for x in 0..glyph.width.min(cell_width) {
            if glyph.bit(x, y) {
                record.payload[dst_y as usize * stride + x / 8] |= 0x80 >> (x % 8);
            }
        }
    }
    record
}

impl Transformer for BitmapTransformer {
    fn name(&self) -> &'static str {
        "bitmap"
    }

    fn transform(&self, font: &mut Font, params: &Params) -> Result<(), Error> {
        let (first, last) = super::codepoint_range(&font.bitmap)?;
        let flags = super::parse_flags(params)?;

        let mut max_width = 0usize;
        let mut max_bearing_y = 0i32;
        let mut min_descender = 0i32;
        for cp in first..=last {
            let Some(g) = font.bitmap.glyph(cp.into()) else {
                continue;
            };
            max_width = max_width.max(g.width);
            max_bearing_y = max_bearing_y.max(g.bearing_y);
            min_descender = min_descender.min(g.bearing_y - g.height as i32);
        }
        let cell_height = (max_bearing_y - min_descender).max(1) as usize;
        let fixed_cell_width = max_width.max(1);

        let mut glyphs = Vec::with_capacity(usize::from(last - first) + 1);
        for cp in first..=last {
            let glyph = font.bitmap.glyph(cp.into());
            // The wire encoding cannot represent width 0, so gaps and
            // zero-width glyphs (a trimmed space) get a one pixel cell.
            let cell_width = if flags.proportional {
                glyph.map(|g| g.width).unwrap_or(0).max(1)
            } else {
                fixed_cell_width
            };
            glyphs.push(pack_glyph_rows(
                glyph,
                cell_width,
                cell_height,
                max_bearing_y,
            ));
        }

        let stream = FontStream {
            flags,
            max_width: fixed_cell_width,
            max_height: cell_height,
            first_codepoint: first,
            last_codepoint: last,
            glyphs,
        };
        font.payload = Some(Payload::BitmapStream(stream.serialize()?));
        Ok(())
    }
}
