//! Vectorizes glyph rasters into tiny move programs and serializes
//! the container stream.

use crate::params::Params;
use crate::pipeline::{Error, Font, Payload, Transformer};
use crate::stream::{FontStream, GlyphRecord, CLASS_TINY};
use teikna::tiny;

pub struct TinyTransformer;

impl Transformer for TinyTransformer {
    fn name(&self) -> &'static str {
        "tiny"
    }

    fn transform(&self, font: &mut Font, params: &Params) -> Result<(), Error> {
        let (first, last) = super::codepoint_range(&font.bitmap)?;
        let flags = super::parse_flags(params)?;
        let optimize = params.get_bool("optimize", true);

        let mut max_width = font.bitmap.cell_width.max(1);
        let mut max_height = font.bitmap.cell_height.max(1);

        let mut glyphs = Vec::with_capacity(usize::from(last - first) + 1);
        for cp in first..=last {
            let glyph = font.bitmap.glyph(cp.into());
            let width = glyph
                .map(|g| g.width)
                .unwrap_or(font.bitmap.cell_width)
                .max(1);
            let height = glyph
                .map(|g| g.height)
                .unwrap_or(font.bitmap.cell_height)
                .max(1);
            max_width = max_width.max(width);
            max_height = max_height.max(height);

            let payload = match glyph {
                Some(g) if g.is_well_formed() => tiny::vectorize(g, optimize)?.to_bytes(),
                _ => Vec::new(),
            };
            glyphs.push(GlyphRecord {
                class: CLASS_TINY,
                width,
                height,
                payload,
            });
        }

        let stream = FontStream {
            flags,
            max_width,
            max_height,
            first_codepoint: first,
            last_codepoint: last,
            glyphs,
        };
        font.payload = Some(Payload::TinyStream(stream.serialize()?));
        Ok(())
    }
}
