//! Rasterizes TrueType/OpenType glyphs into 1bpp bitmaps.
//!
//! Outlines come from `skrifa`, filling from `zeno`. Coverage at or
//! above half is a set pixel, so the output looks like a monochrome
//! render rather than a thresholded grayscale one.

use std::fs;
use std::path::Path;

use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::string::StringId;
use skrifa::{FontRef, GlyphId, MetadataProvider};
use zeno::{Command, Mask, Origin, Vector};

use crate::params::Params;
use crate::pipeline::{Error, Extractor, Font};
use teikna::bitmap::GlyphBitmap;
use teikna::font::BitmapFont;

pub struct TtfExtractor;

/// Collects outline segments as zeno path commands.
#[derive(Default)]
struct MaskPen {
    commands: Vec<Command>,
}

impl OutlinePen for MaskPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(Command::MoveTo(Vector::new(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(Command::LineTo(Vector::new(x, y)));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.commands
            .push(Command::QuadTo(Vector::new(cx0, cy0), Vector::new(x, y)));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.commands.push(Command::CurveTo(
            Vector::new(cx0, cy0),
            Vector::new(cx1, cy1),
            Vector::new(x, y),
        ));
    }

    fn close(&mut self) {
        self.commands.push(Command::Close);
    }
}

fn rasterize_glyph(
    font: &FontRef,
    size: f32,
    codepoint: u8,
    proportional: bool,
) -> Result<GlyphBitmap, Error> {
    let location = LocationRef::default();
    let gid = font
        .charmap()
        .map(u32::from(codepoint))
        .unwrap_or(GlyphId::NOTDEF);
    let advance = font
        .glyph_metrics(Size::new(size), location)
        .advance_width(gid)
        .unwrap_or(0.0)
        .round() as i32;

    let mut glyph = match font.outline_glyphs().get(gid) {
        Some(outline) => {
            let mut pen = MaskPen::default();
            outline.draw(DrawSettings::unhinted(Size::new(size), location), &mut pen)?;
            if pen.commands.is_empty() {
                GlyphBitmap::new(codepoint.into(), 0, 0)
            } else {
                let (coverage, placement) = Mask::new(pen.commands.as_slice())
                    .origin(Origin::BottomLeft)
                    .render();
                let width = placement.width as usize;
                let height = placement.height as usize;
                let mut out = GlyphBitmap::new(codepoint.into(), width, height);
                out.bearing_x = placement.left;
                out.bearing_y = placement.top;
                for y in 0..height {
                    for x in 0..width {
                        if coverage[y * width + x] >= 128 {
                            out.set_bit(x, y);
                        }
                    }
                }
                out
            }
        }
        None => GlyphBitmap::new(codepoint.into(), 0, 0),
    };
    glyph.advance = advance;

    if proportional {
        super::trim_proportional(&mut glyph);
    }
    Ok(glyph)
}

const SAMPLE_CHARS: &[u8] = b"Hnm08Aa";

/// Picks a pixel size for fonts the user gave no `font_size` for, by
/// sampling a few representative characters at every candidate size
/// and scoring the average glyph dimensions against an 8x14 cell.
fn choose_natural_size(font: &FontRef) -> u32 {
    let mut best_size = 16;
    let mut best_score = f64::MIN;

    for size in 8..=32u32 {
        let mut non_empty = 0u32;
        let mut total_w = 0usize;
        let mut total_h = 0usize;
        for &c in SAMPLE_CHARS {
            let Ok(g) = rasterize_glyph(font, size as f32, c, false) else {
                continue;
            };
            if g.width > 0 && g.height > 0 {
                non_empty += 1;
                total_w += g.width;
                total_h += g.height;
            }
        }
        if non_empty == 0 {
            continue;
        }
        let avg_w = total_w as f64 / f64::from(non_empty);
        let avg_h = total_h as f64 / f64::from(non_empty);
        let score = f64::from(non_empty) * 100.0 - (avg_h - 14.0).abs() * 12.0 - (avg_w - 8.0).abs() * 6.0;
        if score > best_score {
            best_score = score;
            best_size = size;
        }
    }
    best_size
}

/// Family name plus subfamily when present, else the input file stem.
fn font_name(font: &FontRef, input: &str) -> String {
    let family = font
        .localized_strings(StringId::FAMILY_NAME)
        .english_or_first()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty());
    match family {
        Some(family) => {
            let style = font
                .localized_strings(StringId::SUBFAMILY_NAME)
                .english_or_first()
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty());
            match style {
                Some(style) => format!("{family} {style}"),
                None => family,
            }
        }
        None => Path::new(input)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string(),
    }
}

impl Extractor for TtfExtractor {
    fn name(&self) -> &'static str {
        "ttf"
    }

    fn extract(&self, params: &Params) -> Result<Font, Error> {
        let input = super::input_path(params)?;
        let (first, last) = super::codepoint_range(params)?;
        let proportional = params.get_proportional(false)?;
        let requested_size = params.get_int("font_size")?;

        let bytes = fs::read(input)?;
        let font = FontRef::new(&bytes)?;

        let size = match requested_size {
            Some(px) if px > 0 => px as u32,
            Some(px) => {
                return Err(Error::InvalidParameter(format!(
                    "font_size must be positive, got {px}"
                )))
            }
            None => {
                let size = choose_natural_size(&font);
                log::info!("no font_size given, using natural size {size}");
                size
            }
        };

        let mut bitmap = BitmapFont {
            name: font_name(&font, input),
            first_codepoint: first.into(),
            last_codepoint: last.into(),
            pixel_size: size,
            ..Default::default()
        };
        for cp in first..=last {
            bitmap
                .glyphs
                .push(rasterize_glyph(&font, size as f32, cp, proportional)?);
        }
        bitmap.update_cell_metrics();

        Ok(Font {
            bitmap,
            payload: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pen_collects_path_commands() {
        let mut pen = MaskPen::default();
        pen.move_to(0.0, 0.0);
        pen.line_to(4.0, 0.0);
        pen.quad_to(4.0, 4.0, 0.0, 4.0);
        pen.close();
        assert_eq!(pen.commands.len(), 4);
        assert_eq!(pen.commands[0], Command::MoveTo(Vector::new(0.0, 0.0)));
        assert_eq!(pen.commands[3], Command::Close);
    }

    #[test]
    fn missing_input_is_reported() {
        assert!(matches!(
            TtfExtractor.extract(&Params::parse("")),
            Err(Error::MissingInput)
        ));
    }

    #[test]
    fn unreadable_font_is_an_io_error() {
        let params = Params::parse("input=/nonexistent/font.ttf");
        assert!(matches!(TtfExtractor.extract(&params), Err(Error::Io(_))));
    }
}
