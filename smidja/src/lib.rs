//! smidja: a bitmap font conversion tool.
//!
//! One invocation runs a three stage pipeline over a single font:
//! an extractor produces packed 1bpp glyph rasters (from a TrueType
//! file, a glyph sheet image, or a previously exported stream), an
//! optional transformer reshapes them (vectorizing into tiny move
//! programs, packing rows, or rasterizing a stream back into glyphs),
//! and an exporter writes the result (raw binary, assembly listing,
//! C array, or a PNG proof sheet).
//!
//! The algorithmic core — bitmap analysis, route optimization and the
//! tiny move codec — lives in the [`teikna`] crate; this crate is the
//! plumbing around it.

pub mod export;
pub mod extract;
pub mod params;
pub mod pipeline;
pub mod stream;
pub mod transform;

pub use pipeline::{run, Error, Font, Options, Payload};
