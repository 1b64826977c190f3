//! Packed 1-bit-per-pixel glyph rasters and their analysis.

use crate::route::RoutePoint;

/// A monochrome glyph raster with typographic metrics.
///
/// Pixels are stored packed, one bit per pixel, most significant bit
/// first within each byte. Each row occupies `stride` bytes; any bits
/// past `width` in the last byte of a row are padding and ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Character identity of this glyph.
    pub codepoint: u32,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Bytes per packed row.
    pub stride: usize,
    /// Horizontal offset from the pen origin to the left edge.
    pub bearing_x: i32,
    /// Vertical offset from the baseline up to the top edge.
    pub bearing_y: i32,
    /// Horizontal pen increment after drawing this glyph.
    pub advance: i32,
    /// Packed pixel data, `stride * height` bytes.
    pub data: Vec<u8>,
}

/// Minimal bounding box of the set bits in a raster.
///
/// All coordinates are `-1` and `empty` is true when no bit is set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub empty: bool,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            left: -1,
            right: -1,
            top: -1,
            bottom: -1,
            empty: true,
        }
    }
}

/// Number of bytes needed to pack `width` pixels at one bit each.
pub fn stride_for_width(width: usize) -> usize {
    width.div_ceil(8)
}

impl GlyphBitmap {
    /// Creates an all-zero bitmap of the given dimensions with the
    /// natural stride for `width`.
    pub fn new(codepoint: u32, width: usize, height: usize) -> Self {
        let stride = stride_for_width(width);
        Self {
            codepoint,
            width,
            height,
            stride,
            data: vec![0; stride * height],
            ..Default::default()
        }
    }

    /// True when the raster has a usable pixel buffer. Degenerate
    /// bitmaps (zero dimensions, missing or short data) are not an
    /// error anywhere in this crate; analysis simply reports them as
    /// empty.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.stride > 0
            && self.data.len() >= self.stride * self.height
    }

    /// Returns the bit at `(x, y)`, or false outside the raster.
    pub fn bit(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y * self.stride + x / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Sets the bit at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn set_bit(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.data[y * self.stride + x / 8] |= 0x80 >> (x % 8);
        }
    }

    /// Clears the bit at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn clear_bit(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.data[y * self.stride + x / 8] &= !(0x80 >> (x % 8));
        }
    }

    /// Toggles the bit at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn toggle_bit(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.data[y * self.stride + x / 8] ^= 0x80 >> (x % 8);
        }
    }

    /// One packed row, without the trailing padding bytes removed.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.stride..y * self.stride + self.stride]
    }

    /// Computes the minimal bounding box containing all set bits.
    ///
    /// The whole raster is scanned even when it turns out to be empty;
    /// there is no early exit that could miss a later set bit. A
    /// degenerate bitmap yields the default (empty) bounds.
    pub fn bounds(&self) -> Bounds {
        if !self.is_well_formed() {
            return Bounds::default();
        }
        let mut out = Bounds {
            left: self.width as i32,
            top: self.height as i32,
            right: -1,
            bottom: -1,
            empty: true,
        };
        for y in 0..self.height {
            for x in 0..self.width {
                if self.bit(x, y) {
                    out.left = out.left.min(x as i32);
                    out.right = out.right.max(x as i32);
                    out.top = out.top.min(y as i32);
                    out.bottom = out.bottom.max(y as i32);
                }
            }
        }
        out.empty = out.right < 0;
        if out.empty {
            out.left = -1;
            out.top = -1;
        }
        out
    }

    /// Column of the leftmost set bit, or `-1` when none is set.
    pub fn leftmost_set_bit(&self) -> i32 {
        self.bounds().left
    }

    /// Column of the rightmost set bit, or `-1` when none is set.
    pub fn rightmost_set_bit(&self) -> i32 {
        self.bounds().right
    }

    /// Collects one route point per set bit, in row-major scan order
    /// (top to bottom, left to right), each tagged with the given color.
    ///
    /// An empty or degenerate raster yields an empty vector.
    pub fn foreground_pixels(&self, color: u8) -> Vec<RoutePoint> {
        let mut out = Vec::new();
        if !self.is_well_formed() {
            return out;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                if self.bit(x, y) {
                    out.push(RoutePoint {
                        x: x as i32,
                        y: y as i32,
                        color,
                        move_only: false,
                    });
                }
            }
        }
        out
    }

    /// Count of set bits in the raster.
    pub fn count_set_bits(&self) -> usize {
        if !self.is_well_formed() {
            return 0;
        }
        let mut n = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.bit(x, y) {
                    n += 1;
                }
            }
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bitmap_5x3(points: &[(usize, usize)]) -> GlyphBitmap {
        let mut g = GlyphBitmap::new(b'A' as u32, 5, 3);
        for &(x, y) in points {
            g.set_bit(x, y);
        }
        g
    }

    #[test]
    fn bounds_of_scattered_pixels() {
        let g = bitmap_5x3(&[(1, 0), (4, 1), (2, 2)]);
        let b = g.bounds();
        assert_eq!(b.left, 1);
        assert_eq!(b.right, 4);
        assert_eq!(b.top, 0);
        assert_eq!(b.bottom, 2);
        assert!(!b.empty);
        assert_eq!(g.leftmost_set_bit(), 1);
        assert_eq!(g.rightmost_set_bit(), 4);
    }

    #[test]
    fn bounds_of_blank_bitmap_are_empty() {
        let g = GlyphBitmap::new(0, 8, 4);
        let b = g.bounds();
        assert!(b.empty);
        assert_eq!(b.left, -1);
        assert_eq!(b.top, -1);
        assert_eq!(b.right, -1);
        assert_eq!(b.bottom, -1);
    }

    #[test]
    fn degenerate_bitmap_yields_empty_results() {
        let g = GlyphBitmap::default();
        assert!(g.bounds().empty);
        assert!(g.foreground_pixels(1).is_empty());
        assert_eq!(g.rightmost_set_bit(), -1);

        // Dimensions without backing data must not panic either.
        let g = GlyphBitmap {
            width: 16,
            height: 16,
            stride: 2,
            ..Default::default()
        };
        assert!(g.bounds().empty);
        assert!(g.foreground_pixels(1).is_empty());
    }

    #[test]
    fn foreground_pixels_match_set_bits() {
        let points = [(1, 0), (4, 1), (2, 2)];
        let g = bitmap_5x3(&points);
        let pixels = g.foreground_pixels(7);
        assert_eq!(pixels.len(), g.count_set_bits());
        let coords: Vec<(usize, usize)> = pixels
            .iter()
            .map(|p| (p.x as usize, p.y as usize))
            .collect();
        // Row-major scan order.
        assert_eq!(coords, vec![(1, 0), (4, 1), (2, 2)]);
        assert!(pixels.iter().all(|p| p.color == 7 && !p.move_only));
    }

    #[test]
    fn bit_addressing_crosses_byte_boundaries() {
        let mut g = GlyphBitmap::new(0, 12, 1);
        assert_eq!(g.stride, 2);
        g.set_bit(0, 0);
        g.set_bit(7, 0);
        g.set_bit(8, 0);
        g.set_bit(11, 0);
        assert_eq!(g.data, vec![0b1000_0001, 0b1001_0000]);
        g.toggle_bit(8, 0);
        assert!(!g.bit(8, 0));
        g.clear_bit(0, 0);
        assert_eq!(g.data[0], 0b0000_0001);
    }
}
