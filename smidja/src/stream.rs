//! The serialized container stream.
//!
//! Both transformers emit this format, the bin exporter writes it out
//! verbatim, the stream extractor reads it back, and the raster
//! transformer decodes it. Layout:
//!
//! ```text
//! header (5 bytes)   flags, max_width-1, max_height-1, first, last
//! offset table       one u16le per codepoint in first..=last,
//!                    measured from the start of the stream
//! glyph records      class byte (class in bits 5-7), width-1,
//!                    height-1, count, payload
//! ```
//!
//! For bitmap records (class 0) the count byte is the payload size in
//! bytes; for tiny records (class 1) it is the move count and the
//! payload is a two byte origin followed by the move bytes. Offsets
//! are 16 bit, which caps the whole stream at 64KiB.

use thiserror::Error;

pub const HEADER_LEN: usize = 5;

pub const CLASS_BITMAP: u8 = 0;
pub const CLASS_TINY: u8 = 1;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("serialized font too large (>64KiB)")]
    FontTooLarge,
    #[error("glyph payload too large for the container format ({0} > 255)")]
    PayloadTooLarge(usize),
    #[error("{got} glyph records for a codepoint range of {expected}")]
    CountMismatch { got: usize, expected: usize },
    #[error("stream shorter than the {HEADER_LEN} byte header")]
    TruncatedHeader,
    #[error("truncated offset table")]
    TruncatedOffsets,
    #[error("invalid codepoint range {first}..{last}")]
    InvalidRange { first: u8, last: u8 },
    #[error("glyph record at offset {0:#06x} lies outside the stream")]
    TruncatedGlyph(u16),
}

/// Header flag byte: proportional bit, space width, letter spacing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub proportional: bool,
    /// Width of the space character in pixels, 0..=7. Only meaningful
    /// for proportional fonts.
    pub space_width: u8,
    /// Extra pixels between glyphs, 0..=15.
    pub letter_spacing: u8,
}

impl Flags {
    pub fn to_byte(self) -> u8 {
        (u8::from(self.proportional) << 7)
            | ((self.space_width & 0x07) << 4)
            | (self.letter_spacing & 0x0F)
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            proportional: byte & 0x80 != 0,
            space_width: (byte >> 4) & 0x07,
            letter_spacing: byte & 0x0F,
        }
    }
}

/// One glyph record. `width`/`height` are actual pixel dimensions;
/// the wire encoding subtracts one, so both are clamped to 1..=256
/// when serialized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphRecord {
    pub class: u8,
    pub width: usize,
    pub height: usize,
    pub payload: Vec<u8>,
}

impl GlyphRecord {
    /// Value of the record's count byte.
    pub fn count(&self) -> usize {
        if self.class == CLASS_TINY {
            self.payload.len().saturating_sub(2)
        } else {
            self.payload.len()
        }
    }
}

/// A parsed or to-be-serialized container stream. Holds one record
/// per codepoint in `first_codepoint..=last_codepoint`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontStream {
    pub flags: Flags,
    pub max_width: usize,
    pub max_height: usize,
    pub first_codepoint: u8,
    pub last_codepoint: u8,
    pub glyphs: Vec<GlyphRecord>,
}

impl FontStream {
    /// Number of codepoints the header declares.
    pub fn codepoint_count(&self) -> usize {
        if self.last_codepoint < self.first_codepoint {
            return 0;
        }
        usize::from(self.last_codepoint - self.first_codepoint) + 1
    }

    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        if self.last_codepoint < self.first_codepoint {
            return Err(Error::InvalidRange {
                first: self.first_codepoint,
                last: self.last_codepoint,
            });
        }
        let expected = self.codepoint_count();
        if self.glyphs.len() != expected {
            return Err(Error::CountMismatch {
                got: self.glyphs.len(),
                expected,
            });
        }

        let mut offsets = Vec::with_capacity(self.glyphs.len());
        let mut offset = HEADER_LEN + self.glyphs.len() * 2;
        for glyph in &self.glyphs {
            if glyph.count() > 255 {
                return Err(Error::PayloadTooLarge(glyph.count()));
            }
            if offset > 0xFFFF {
                return Err(Error::FontTooLarge);
            }
            offsets.push(offset as u16);
            offset += 4 + glyph.payload.len();
        }
        // The last record must end within the 16 bit address space too.
        if offset > 0x10000 {
            return Err(Error::FontTooLarge);
        }

        let mut out = Vec::with_capacity(offset);
        out.push(self.flags.to_byte());
        out.push((self.max_width.clamp(1, 256) - 1) as u8);
        out.push((self.max_height.clamp(1, 256) - 1) as u8);
        out.push(self.first_codepoint);
        out.push(self.last_codepoint);
        for off in offsets {
            out.extend_from_slice(&off.to_le_bytes());
        }
        for glyph in &self.glyphs {
            out.push((glyph.class & 0x07) << 5);
            out.push((glyph.width.clamp(1, 256) - 1) as u8);
            out.push((glyph.height.clamp(1, 256) - 1) as u8);
            out.push(glyph.count() as u8);
            out.extend_from_slice(&glyph.payload);
        }
        Ok(out)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::TruncatedHeader);
        }
        let flags = Flags::from_byte(bytes[0]);
        let max_width = usize::from(bytes[1]) + 1;
        let max_height = usize::from(bytes[2]) + 1;
        let first_codepoint = bytes[3];
        let last_codepoint = bytes[4];
        if last_codepoint < first_codepoint {
            return Err(Error::InvalidRange {
                first: first_codepoint,
                last: last_codepoint,
            });
        }

        let count = usize::from(last_codepoint - first_codepoint) + 1;
        let table_end = HEADER_LEN + count * 2;
        if bytes.len() < table_end {
            return Err(Error::TruncatedOffsets);
        }

        let mut glyphs = Vec::with_capacity(count);
        for i in 0..count {
            let pos = HEADER_LEN + i * 2;
            let off = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
            let start = usize::from(off);
            if start + 4 > bytes.len() {
                return Err(Error::TruncatedGlyph(off));
            }

            let class = bytes[start] >> 5;
            let width = usize::from(bytes[start + 1]) + 1;
            let height = usize::from(bytes[start + 2]) + 1;
            let declared = usize::from(bytes[start + 3]);
            let payload_len = if class == CLASS_TINY {
                if declared > 0 {
                    declared + 2
                } else {
                    0
                }
            } else {
                declared
            };
            let end = start + 4 + payload_len;
            if end > bytes.len() {
                return Err(Error::TruncatedGlyph(off));
            }

            glyphs.push(GlyphRecord {
                class,
                width,
                height,
                payload: bytes[start + 4..end].to_vec(),
            });
        }

        Ok(Self {
            flags,
            max_width,
            max_height,
            first_codepoint,
            last_codepoint,
            glyphs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_stream() -> FontStream {
        FontStream {
            flags: Flags {
                proportional: true,
                space_width: 3,
                letter_spacing: 2,
            },
            max_width: 6,
            max_height: 8,
            first_codepoint: 65,
            last_codepoint: 67,
            glyphs: vec![
                GlyphRecord {
                    class: CLASS_TINY,
                    width: 5,
                    height: 7,
                    // origin (1, 2) plus three move bytes
                    payload: vec![1, 2, 0x81, 0x21, 0x41],
                },
                GlyphRecord {
                    class: CLASS_TINY,
                    width: 3,
                    height: 3,
                    payload: Vec::new(),
                },
                GlyphRecord {
                    class: CLASS_BITMAP,
                    width: 6,
                    height: 2,
                    payload: vec![0xF0, 0x0F],
                },
            ],
        }
    }

    #[test]
    fn flag_byte_round_trip() {
        let flags = Flags {
            proportional: true,
            space_width: 5,
            letter_spacing: 12,
        };
        let byte = flags.to_byte();
        assert_eq!(byte, 0b1101_1100);
        assert_eq!(Flags::from_byte(byte), flags);
    }

    #[test]
    fn header_and_offsets_layout() {
        let bytes = sample_stream().serialize().unwrap();
        assert_eq!(&bytes[..5], &[0b1011_0010, 5, 7, 65, 67]);
        // offsets: header 5 + table 6 = 11; records are 4 + payload.
        assert_eq!(u16::from_le_bytes([bytes[5], bytes[6]]), 11);
        assert_eq!(u16::from_le_bytes([bytes[7], bytes[8]]), 20);
        assert_eq!(u16::from_le_bytes([bytes[9], bytes[10]]), 24);
        // first record: tiny class, 5x7 minus-one, 3 moves.
        assert_eq!(&bytes[11..15], &[1 << 5, 4, 6, 3]);
    }

    #[test]
    fn serialize_parse_round_trip() {
        let stream = sample_stream();
        let parsed = FontStream::parse(&stream.serialize().unwrap()).unwrap();
        assert_eq!(parsed, stream);
    }

    #[test]
    fn empty_tiny_record_has_zero_count() {
        let bytes = sample_stream().serialize().unwrap();
        let second = usize::from(u16::from_le_bytes([bytes[7], bytes[8]]));
        assert_eq!(bytes[second + 3], 0);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut stream = sample_stream();
        stream.glyphs[2].payload = vec![0; 256];
        assert_eq!(stream.serialize(), Err(Error::PayloadTooLarge(256)));
    }

    #[test]
    fn stream_over_64k_is_rejected() {
        let glyphs = (0..=255)
            .map(|_| GlyphRecord {
                class: CLASS_BITMAP,
                width: 256,
                height: 8,
                payload: vec![0; 255],
            })
            .collect();
        let stream = FontStream {
            first_codepoint: 0,
            last_codepoint: 255,
            max_width: 256,
            max_height: 8,
            glyphs,
            ..Default::default()
        };
        assert_eq!(stream.serialize(), Err(Error::FontTooLarge));
    }

    // Every record here starts below 0xFFFF but the last one runs past
    // the end of the address space: header 5 + table 504 + 252 records
    // of 259 bytes puts the last start at 65518 and its end at 65777.
    #[test]
    fn stream_ending_past_64k_is_rejected() {
        let glyphs = (0..252)
            .map(|_| GlyphRecord {
                class: CLASS_BITMAP,
                width: 256,
                height: 8,
                payload: vec![0; 255],
            })
            .collect();
        let stream = FontStream {
            first_codepoint: 0,
            last_codepoint: 251,
            max_width: 256,
            max_height: 8,
            glyphs,
            ..Default::default()
        };
        assert_eq!(stream.serialize(), Err(Error::FontTooLarge));
    }

    #[test]
    fn record_count_must_match_range() {
        let mut stream = sample_stream();
        stream.glyphs.pop();
        assert_eq!(
            stream.serialize(),
            Err(Error::CountMismatch {
                got: 2,
                expected: 3,
            })
        );
    }

    #[test]
    fn truncated_streams_are_rejected() {
        let bytes = sample_stream().serialize().unwrap();
        assert_eq!(FontStream::parse(&bytes[..3]), Err(Error::TruncatedHeader));
        assert_eq!(
            FontStream::parse(&bytes[..8]),
            Err(Error::TruncatedOffsets)
        );
        assert!(matches!(
            FontStream::parse(&bytes[..bytes.len() - 1]),
            Err(Error::TruncatedGlyph(_))
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let bytes = [0, 5, 7, 90, 65];
        assert_eq!(
            FontStream::parse(&bytes),
            Err(Error::InvalidRange {
                first: 90,
                last: 65,
            })
        );
    }
}
