//! Writes the payload bytes verbatim, or raw packed glyph rows when
//! no transformer ran.

use std::fs;

use crate::params::Params;
use crate::pipeline::{Error, Exporter, Font};

pub struct BinExporter;

/// Concatenated packed rows of every glyph, in codepoint order.
pub(crate) fn raw_rows(font: &Font) -> Vec<u8> {
    let mut packed = Vec::new();
    for glyph in &font.bitmap.glyphs {
        if !glyph.is_well_formed() {
            continue;
        }
        for y in 0..glyph.height {
            packed.extend_from_slice(glyph.row(y));
        }
    }
    packed
}

impl Exporter for BinExporter {
    fn name(&self) -> &'static str {
        "bin"
    }

    fn export(&self, font: &Font, params: &Params) -> Result<(), Error> {
        let output = super::output_path(params)?;
        let bytes = match &font.payload {
            Some(payload) => payload.bytes().to_vec(),
            None => raw_rows(font),
        };
        fs::write(output, &bytes)?;
        log::info!("wrote {} bytes to {output}", bytes.len());
        Ok(())
    }
}
