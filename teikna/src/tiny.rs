//! The tiny move codec: glyph rasters as compact pen programs.
//!
//! A tiny glyph is a 2-byte origin followed by single-byte moves. Each
//! move packs a signed displacement of up to ±3 per axis together with
//! a 2-bit pen color. Replaying the moves from the origin reconstructs
//! the glyph raster exactly; encoding is lossless by construction, with
//! long jumps decomposed into color-less travel steps.
//!
//! Bit layout of one move byte, most significant bit first:
//!
//! ```text
//! c1 | dx magnitude (2 bits) | dy magnitude (2 bits) | dy sign | dx sign | c0
//! ```
//!
//! The pen color is `(c1 << 1) | c0`: 0 none (travel only), 1 clear,
//! 2 set, 3 toggle. The encoder only ever emits none and set; the
//! decoder honors all four.

use thiserror::Error;

use crate::bitmap::GlyphBitmap;
use crate::route::{Optimizer, RoutePoint};

/// Hard ceiling on moves per glyph; the container format stores the
/// move count in a single byte.
pub const MAX_MOVES: usize = 255;

/// Largest displacement one move can carry per axis.
pub const MAX_STEP: i32 = 3;

/// Routes shorter than this are not worth a 2-opt pass.
const MIN_ROUTE_FOR_OPT: usize = 4;

/// Failures of the codec. Analysis and optimization never fail; these
/// are the capacity and corruption cases that must reach the caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("glyph needs {0} moves; the move count field holds at most {MAX_MOVES}")]
    TooManyMoves(usize),

    #[error("tiny glyph payload of {0} bytes is too short to hold an origin")]
    TruncatedPayload(usize),
}

/// Pen state carried by one move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Color {
    /// Travel only; no pixel is touched.
    #[default]
    None = 0,
    /// Clear the destination pixel.
    Clear = 1,
    /// Set the destination pixel.
    Set = 2,
    /// Toggle the destination pixel.
    Toggle = 3,
}

impl Color {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Color::None,
            1 => Color::Clear,
            2 => Color::Set,
            _ => Color::Toggle,
        }
    }
}

/// One decoded pen transition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Move {
    pub dx: i32,
    pub dy: i32,
    pub color: Color,
}

impl Move {
    pub fn new(dx: i32, dy: i32, color: Color) -> Self {
        Self { dx, dy, color }
    }

    /// Packs the move into its byte encoding. Displacements beyond
    /// ±[`MAX_STEP`] are clamped; encoders are expected to have split
    /// them beforehand.
    pub fn to_byte(self) -> u8 {
        let dx = self.dx.clamp(-MAX_STEP, MAX_STEP);
        let dy = self.dy.clamp(-MAX_STEP, MAX_STEP);
        let sx = u8::from(dx < 0);
        let sy = u8::from(dy < 0);
        let color = self.color as u8;

        ((color >> 1) & 1) << 7
            | (dx.unsigned_abs() as u8) << 5
            | (dy.unsigned_abs() as u8) << 3
            | sy << 2
            | sx << 1
            | (color & 1)
    }

    /// Unpacks a move byte.
    pub fn from_byte(byte: u8) -> Self {
        let adx = i32::from((byte >> 5) & 0x3);
        let ady = i32::from((byte >> 3) & 0x3);
        let sx = (byte >> 1) & 1;
        let sy = (byte >> 2) & 1;
        let color = Color::from_bits(((byte >> 7) & 1) << 1 | (byte & 1));
        Self {
            dx: if sx == 1 { -adx } else { adx },
            dy: if sy == 1 { -ady } else { ady },
            color,
        }
    }
}

/// An encoded glyph: origin plus pen program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TinyGlyph {
    /// Starting pen position, clamped into 0..=255 per axis.
    pub origin: (u8, u8),
    pub moves: Vec<Move>,
}

impl TinyGlyph {
    /// Number of encoded moves.
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Serializes origin and moves. A glyph with no moves serializes
    /// to an empty payload; the origin would be meaningless.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.moves.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(2 + self.moves.len());
        out.push(self.origin.0);
        out.push(self.origin.1);
        out.extend(self.moves.iter().map(|m| m.to_byte()));
        out
    }
}

fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Appends travel-only steps covering the displacement `(dx, dy)`,
/// greedily consuming up to ±[`MAX_STEP`] per axis per step.
fn append_travel_steps(out: &mut Vec<Move>, dx: i32, dy: i32) {
    let mut rem_x = dx;
    let mut rem_y = dy;
    while rem_x != 0 || rem_y != 0 {
        let sx = rem_x.clamp(-MAX_STEP, MAX_STEP);
        let sy = rem_y.clamp(-MAX_STEP, MAX_STEP);
        out.push(Move::new(sx, sy, Color::None));
        rem_x -= sx;
        rem_y -= sy;
    }
}

/// Encodes a glyph raster as a tiny pen program.
///
/// Foreground pixels are visited in scan order, or in 2-opt order when
/// `optimize` is set and the glyph has at least four pixels. Adjacent
/// targets become a single set move; distant targets are reached with
/// travel steps followed by a zero-displacement set. A glyph with no
/// foreground pixels encodes to an empty program, which is valid and
/// distinct from an error.
///
/// Fails with [`Error::TooManyMoves`] when the program would exceed
/// [`MAX_MOVES`]; nothing truncated is ever returned.
pub fn vectorize(glyph: &GlyphBitmap, optimize: bool) -> Result<TinyGlyph, Error> {
    let mut points = glyph.foreground_pixels(1);
    if points.is_empty() {
        return Ok(TinyGlyph::default());
    }

    if optimize && points.len() >= MIN_ROUTE_FOR_OPT {
        points = Optimizer::default().two_opt(&points);
    }

    let origin = (clamp_u8(points[0].x), clamp_u8(points[0].y));
    let mut moves = Vec::with_capacity(points.len());
    // The origin pixel itself is a dot at zero displacement.
    moves.push(Move::new(0, 0, Color::Set));

    let mut cx = points[0].x;
    let mut cy = points[0].y;
    for point in &points[1..] {
        let dx = point.x - cx;
        let dy = point.y - cy;
        if dx.abs() <= 1 && dy.abs() <= 1 {
            moves.push(Move::new(dx, dy, Color::Set));
        } else {
            append_travel_steps(&mut moves, dx, dy);
            moves.push(Move::new(0, 0, Color::Set));
        }
        cx = point.x;
        cy = point.y;
    }

    if moves.len() > MAX_MOVES {
        return Err(Error::TooManyMoves(moves.len()));
    }

    log::debug!(
        "vectorized U+{:04X}: {} pixels, {} moves",
        glyph.codepoint,
        points.len(),
        moves.len()
    );

    Ok(TinyGlyph {
        origin,
        moves,
    })
}

fn paint(bitmap: &mut GlyphBitmap, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    match color {
        Color::None => {}
        Color::Clear => bitmap.clear_bit(x, y),
        Color::Set => bitmap.set_bit(x, y),
        Color::Toggle => bitmap.toggle_bit(x, y),
    }
}

/// Paints a straight line of pixels from `start` to `end` inclusive.
/// Pixels falling outside the raster are dropped silently.
pub fn draw_line(bitmap: &mut GlyphBitmap, start: (i32, i32), end: (i32, i32), color: Color) {
    let (mut x0, mut y0) = start;
    let (mut x1, mut y1) = end;

    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let mut error = dx / 2;
    let ystep = if y0 < y1 { 1 } else { -1 };
    let mut y = y0;

    for x in x0..=x1 {
        if steep {
            paint(bitmap, y, x, color);
        } else {
            paint(bitmap, x, y, color);
        }
        error -= dy;
        if error < 0 {
            y += ystep;
            error += dx;
        }
    }
}

/// Replays a tiny glyph payload onto a fresh raster of the given
/// dimensions.
///
/// The payload is the origin pair followed by move bytes, exactly as
/// [`TinyGlyph::to_bytes`] lays them out. An empty payload yields an
/// all-zero bitmap. Colored moves paint a line from the previous pen
/// position to the new one, so set, clear and toggle all apply along
/// the travelled span.
pub fn rasterize(
    codepoint: u32,
    width: usize,
    height: usize,
    payload: &[u8],
) -> Result<GlyphBitmap, Error> {
    let mut out = GlyphBitmap::new(codepoint, width, height);
    if payload.is_empty() {
        return Ok(out);
    }
    if payload.len() < 2 {
        return Err(Error::TruncatedPayload(payload.len()));
    }

    let mut pen = (i32::from(payload[0]), i32::from(payload[1]));
    for &byte in &payload[2..] {
        let mv = Move::from_byte(byte);
        let end = (pen.0 + mv.dx, pen.1 + mv.dy);
        if mv.color != Color::None {
            draw_line(&mut out, pen, end, mv.color);
        }
        pen = end;
    }
    Ok(out)
}
