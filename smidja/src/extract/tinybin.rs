//! Loads a previously exported container stream back into the
//! pipeline, for the raster transformer to decode.

use std::fs;
use std::path::Path;

use crate::params::Params;
use crate::pipeline::{Error, Extractor, Font, Payload};
use crate::stream::FontStream;
use teikna::font::BitmapFont;

pub struct TinyBinExtractor;

impl Extractor for TinyBinExtractor {
    fn name(&self) -> &'static str {
        "tinybin"
    }

    fn extract(&self, params: &Params) -> Result<Font, Error> {
        let input = super::input_path(params)?;
        let bytes = fs::read(input)?;
        // Validate up front so a bad file fails here rather than deep
        // inside a later stage.
        let parsed = FontStream::parse(&bytes)?;
        log::debug!(
            "loaded stream: {} codepoints, {} bytes",
            parsed.codepoint_count(),
            bytes.len()
        );

        let name = Path::new(input)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("tinybin")
            .to_string();

        Ok(Font {
            bitmap: BitmapFont {
                name,
                first_codepoint: parsed.first_codepoint.into(),
                last_codepoint: parsed.last_codepoint.into(),
                ..Default::default()
            },
            payload: Some(Payload::TinyStream(bytes)),
        })
    }
}
