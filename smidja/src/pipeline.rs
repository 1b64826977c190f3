//! Pipeline orchestration: extract, optionally transform, export.

use std::path::Path;

use thiserror::Error;

use crate::export;
use crate::extract;
use crate::params::{ParamError, Params};
use crate::stream;
use crate::transform;
use teikna::font::BitmapFont;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown {kind} '{name}'")]
    UnknownStage { kind: &'static str, name: String },
    #[error("cannot infer an extractor from '{0}'; pass --extractor")]
    UnknownInputFormat(String),
    #[error("extractor input path is required")]
    MissingInput,
    #[error("exporter output path is required")]
    MissingOutput,
    #[error("{0}")]
    InvalidParameter(String),
    #[error("{0}")]
    InvalidFont(String),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Stream(#[from] stream::Error),
    #[error(transparent)]
    Tiny(#[from] teikna::tiny::Error),
    #[error("font file: {0}")]
    FontRead(#[from] skrifa::raw::ReadError),
    #[error("glyph outline: {0}")]
    Draw(#[from] skrifa::outline::DrawError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The byte stream a transformer hands to downstream stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// A container stream whose records are tiny move programs.
    TinyStream(Vec<u8>),
    /// A container stream whose records are packed bitmap rows.
    BitmapStream(Vec<u8>),
}

impl Payload {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Payload::TinyStream(bytes) | Payload::BitmapStream(bytes) => bytes,
        }
    }
}

/// The value passed between stages: glyph rasters plus an optional
/// serialized payload produced by a transformer.
#[derive(Clone, Debug, Default)]
pub struct Font {
    pub bitmap: BitmapFont,
    pub payload: Option<Payload>,
}

pub trait Extractor {
    fn name(&self) -> &'static str;
    fn extract(&self, params: &Params) -> Result<Font, Error>;
}

pub trait Transformer {
    fn name(&self) -> &'static str;
    fn transform(&self, font: &mut Font, params: &Params) -> Result<(), Error>;
}

pub trait Exporter {
    fn name(&self) -> &'static str;
    fn export(&self, font: &Font, params: &Params) -> Result<(), Error>;
}

pub fn extractor(name: &str) -> Option<Box<dyn Extractor>> {
    match name {
        "ttf" => Some(Box::new(extract::ttf::TtfExtractor)),
        "image" => Some(Box::new(extract::image::ImageExtractor)),
        "tinybin" => Some(Box::new(extract::tinybin::TinyBinExtractor)),
        _ => None,
    }
}

pub fn transformer(name: &str) -> Option<Box<dyn Transformer>> {
    match name {
        "tiny" => Some(Box::new(transform::tiny::TinyTransformer)),
        "bitmap" => Some(Box::new(transform::bitmap::BitmapTransformer)),
        "raster" => Some(Box::new(transform::raster::RasterTransformer)),
        _ => None,
    }
}

pub fn exporter(name: &str) -> Option<Box<dyn Exporter>> {
    match name {
        "bin" => Some(Box::new(export::bin::BinExporter)),
        "asm" => Some(Box::new(export::asm::AsmExporter)),
        "carray" => Some(Box::new(export::carray::CArrayExporter)),
        "png" => Some(Box::new(export::png::PngExporter)),
        _ => None,
    }
}

/// Picks an extractor from the input path's extension when none was
/// named on the command line.
pub fn infer_extractor(input: &str) -> Result<&'static str, Error> {
    let ext = Path::new(input)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "ttf" | "otf" => Ok("ttf"),
        "png" | "bmp" | "gif" | "jpg" | "jpeg" | "tga" => Ok("image"),
        "bin" => Ok("tinybin"),
        _ => Err(Error::UnknownInputFormat(input.to_string())),
    }
}

/// Selected stages and their raw parameter strings.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub extractor: Option<String>,
    pub extractor_parameters: String,
    pub transformer: Option<String>,
    pub transformer_parameters: String,
    pub exporter: String,
    pub exporter_parameters: String,
}

/// Runs one pipeline invocation, reporting each completed stage on
/// stdout.
pub fn run(options: &Options) -> Result<(), Error> {
    let extract_params = Params::parse(&options.extractor_parameters);
    let name = match options.extractor.as_deref() {
        Some(name) => name.to_string(),
        None => {
            let input = extract_params.get("input").ok_or(Error::MissingInput)?;
            infer_extractor(input)?.to_string()
        }
    };
    let stage = extractor(&name).ok_or_else(|| Error::UnknownStage {
        kind: "extractor",
        name: name.clone(),
    })?;
    log::debug!("running extractor '{}'", stage.name());
    let mut font = stage.extract(&extract_params)?;
    println!("extracted with: {}", stage.name());

    if let Some(name) = options.transformer.as_deref() {
        let stage = transformer(name).ok_or_else(|| Error::UnknownStage {
            kind: "transformer",
            name: name.to_string(),
        })?;
        log::debug!("running transformer '{}'", stage.name());
        stage.transform(&mut font, &Params::parse(&options.transformer_parameters))?;
        println!("transformed with: {}", stage.name());
    }

    let stage = exporter(&options.exporter).ok_or_else(|| Error::UnknownStage {
        kind: "exporter",
        name: options.exporter.clone(),
    })?;
    log::debug!("running exporter '{}'", stage.name());
    stage.export(&font, &Params::parse(&options.exporter_parameters))?;
    println!("exported with: {}", stage.name());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_every_stage() {
        for name in ["ttf", "image", "tinybin"] {
            assert_eq!(extractor(name).map(|s| s.name()), Some(name));
        }
        for name in ["tiny", "bitmap", "raster"] {
            assert_eq!(transformer(name).map(|s| s.name()), Some(name));
        }
        for name in ["bin", "asm", "carray", "png"] {
            assert_eq!(exporter(name).map(|s| s.name()), Some(name));
        }
        assert!(extractor("dlopen").is_none());
        assert!(transformer("dlopen").is_none());
        assert!(exporter("dlopen").is_none());
    }

    #[test]
    fn extractor_inference_from_extension() {
        assert_eq!(infer_extractor("font.ttf").unwrap(), "ttf");
        assert_eq!(infer_extractor("font.OTF").unwrap(), "ttf");
        assert_eq!(infer_extractor("sheet.png").unwrap(), "image");
        assert_eq!(infer_extractor("stream.bin").unwrap(), "tinybin");
        assert!(matches!(
            infer_extractor("font.woff2"),
            Err(Error::UnknownInputFormat(_))
        ));
    }
}
