//! C source exporter: the stream (or raw glyph cells) as a
//! `const uint8_t` array.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::params::Params;
use crate::pipeline::{Error, Exporter, Font};
use teikna::bitmap::stride_for_width;

pub struct CArrayExporter;

fn positive_param(
    params: &Params,
    key: &str,
    default: usize,
) -> Result<usize, Error> {
    match params.get_int(key)? {
        None => Ok(default),
        Some(v) if v > 0 && v <= 1024 => Ok(v as usize),
        Some(_) => Err(Error::InvalidParameter(format!(
            "{key} must be in range 1..1024"
        ))),
    }
}

/// Fixed-size glyph cells: `rows` rows of `bytes_per_row` bytes per
/// codepoint, zero padded, glyphs cropped to fit.
fn raw_cells(font: &Font, bytes_per_row: usize, rows: usize) -> Vec<u8> {
    let glyph_bytes = bytes_per_row * rows;
    let mut packed = vec![0u8; font.bitmap.glyphs.len() * glyph_bytes];
    let max_width_bits = bytes_per_row * 8;

    for (i, glyph) in font.bitmap.glyphs.iter().enumerate() {
        if !glyph.is_well_formed() {
            continue;
        }
        let base = i * glyph_bytes;
        for y in 0..rows.min(glyph.height) {
            for x in 0..max_width_bits.min(glyph.width) {
                if glyph.bit(x, y) {
                    packed[base + y * bytes_per_row + x / 8] |= 0x80 >> (x % 8);
                }
            }
        }
    }
    packed
}

fn render(
    packed: &[u8],
    file_name: &str,
    symbol: &str,
    bytes_per_line: usize,
    include_stdint: bool,
    hex_prefix: bool,
    uppercase_hex: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// {file_name}");
    let _ = writeln!(out, "// .bin raw binary rendered as C array.");
    let _ = writeln!(out, "//");
    let _ = writeln!(out, "// Format is .bin, size (in bytes) is {}.", packed.len());
    if include_stdint {
        out.push_str("#include <stdint.h>\n\n");
    }
    let _ = writeln!(out, "const uint8_t {symbol}[] = {{");

    for (i, byte) in packed.iter().enumerate() {
        if i % bytes_per_line == 0 {
            out.push_str("    ");
        }
        if hex_prefix {
            out.push_str("0x");
        }
        if uppercase_hex {
            let _ = write!(out, "{byte:02X}");
        } else {
            let _ = write!(out, "{byte:02x}");
        }
        if i + 1 < packed.len() {
            out.push_str(", ");
        }
        if (i + 1) % bytes_per_line == 0 {
            out.push('\n');
        }
    }
    if packed.len() % bytes_per_line != 0 {
        out.push('\n');
    }
    out.push_str("};\n");
    out
}

impl Exporter for CArrayExporter {
    fn name(&self) -> &'static str {
        "carray"
    }

    fn export(&self, font: &Font, params: &Params) -> Result<(), Error> {
        let output = super::output_path(params)?;
        let bytes_per_line = positive_param(params, "bytes_per_line", 8)?;

        let packed = match &font.payload {
            Some(payload) => payload.bytes().to_vec(),
            None => {
                let bytes_per_row = positive_param(
                    params,
                    "bytes_per_row",
                    stride_for_width(font.bitmap.cell_width.max(1)),
                )?;
                let rows = positive_param(params, "rows", font.bitmap.cell_height.max(1))?;
                raw_cells(font, bytes_per_row, rows)
            }
        };

        let symbol = match params.get("symbol") {
            Some(v) if !v.is_empty() => super::sanitize_symbol(v),
            _ => super::symbol_from_output(output),
        };
        let file_name = Path::new(output)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(output);

        let text = render(
            &packed,
            file_name,
            &symbol,
            bytes_per_line,
            params.get_bool("include_stdint", true),
            params.get_bool("hex_prefix", true),
            params.get_bool("uppercase_hex", false),
        );
        fs::write(output, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Payload;
    use pretty_assertions::assert_eq;
    use teikna::bitmap::GlyphBitmap;
    use teikna::font::BitmapFont;

    #[test]
    fn renders_payload_as_array() {
        let file = tempfile::NamedTempFile::with_suffix(".c").unwrap();
        let font = Font {
            bitmap: BitmapFont::default(),
            payload: Some(Payload::BitmapStream(vec![0xDE, 0xAD, 0xBE, 0xEF])),
        };
        let params = Params::parse(&format!(
            "output={},symbol=blob,bytes_per_line=2",
            file.path().display()
        ));
        CArrayExporter.export(&font, &params).unwrap();

        let text = fs::read_to_string(file.path()).unwrap();
        assert!(text.contains("#include <stdint.h>"));
        assert!(text.contains("const uint8_t blob[] = {"));
        assert!(text.contains("    0xde, 0xad, \n"));
        assert!(text.contains("    0xbe, 0xef\n"));
        assert!(text.contains("size (in bytes) is 4."));
    }

    #[test]
    fn raw_cells_are_fixed_size() {
        let mut a = GlyphBitmap::new(65, 3, 2);
        a.set_bit(0, 0);
        a.set_bit(2, 1);
        let b = GlyphBitmap::new(66, 3, 1);
        let font = Font {
            bitmap: BitmapFont {
                first_codepoint: 65,
                last_codepoint: 66,
                cell_width: 3,
                cell_height: 2,
                glyphs: vec![a, b],
                ..Default::default()
            },
            payload: None,
        };
        let packed = raw_cells(&font, 1, 2);
        assert_eq!(packed, vec![0b1000_0000, 0b0010_0000, 0, 0]);
    }

    #[test]
    fn bytes_per_line_is_validated() {
        let font = Font::default();
        let params = Params::parse("output=/tmp/x.c,bytes_per_line=0");
        assert!(matches!(
            CArrayExporter.export(&font, &params),
            Err(Error::InvalidParameter(_))
        ));
    }
}
