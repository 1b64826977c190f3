//! Bitmap glyph analysis, pen route optimization and tiny move streams.
//!
//! This crate holds the algorithmic half of a bitmap font conversion
//! pipeline. Given a packed 1-bit-per-pixel glyph raster it can compute
//! tight bounds, enumerate foreground pixels, reorder them into a cheap
//! pen route with a 2-opt heuristic, and encode the route as a compact
//! stream of small relative moves. The inverse direction replays a move
//! stream back onto a pixel grid, reconstructing the original raster
//! bit for bit.
//!
//! File formats, rasterization of outline fonts and the surrounding
//! conversion tool live in the `smidja` crate; nothing here touches the
//! filesystem.

#![forbid(unsafe_code)]

pub mod bitmap;
pub mod font;
pub mod route;
pub mod tiny;

pub use bitmap::{Bounds, GlyphBitmap};
pub use font::BitmapFont;
