//! Slices a glyph grid out of a raster image.
//!
//! The sheet is divided into `columns` x `rows` cells inside the
//! outer margins; padding shrinks each cell to its drawable area.
//! A pixel is foreground when it sits closer to the foreground
//! reference color than to the background one.

use std::path::Path;

use image::Rgba;

use crate::params::{Params, Rgb};
use crate::pipeline::{Error, Extractor, Font};
use teikna::bitmap::GlyphBitmap;
use teikna::font::BitmapFont;

/// Distance below which a pixel counts as the transparent color.
const TRANSPARENT_THRESHOLD: i32 = 48;

pub struct ImageExtractor;

struct Classifier {
    fore: Rgb,
    back: Rgb,
    transparent: Option<Rgb>,
    inverse: bool,
}

impl Classifier {
    fn is_foreground(&self, px: Rgba<u8>) -> bool {
        let [r, g, b, a] = px.0;
        if a == 0 {
            return false;
        }
        let c = Rgb { r, g, b };
        if let Some(t) = self.transparent {
            if c.distance_sq(t) <= TRANSPARENT_THRESHOLD * TRANSPARENT_THRESHOLD {
                return false;
            }
        }
        let on = c.distance_sq(self.fore) <= c.distance_sq(self.back);
        on != self.inverse
    }
}

impl Extractor for ImageExtractor {
    fn name(&self) -> &'static str {
        "image"
    }

    fn extract(&self, params: &Params) -> Result<Font, Error> {
        let input = super::input_path(params)?;
        let (first, last) = super::codepoint_range(params)?;
        let glyph_count = usize::from(last - first) + 1;

        let columns = params.get_int("columns")?.unwrap_or(0);
        if columns <= 0 {
            return Err(Error::InvalidParameter(
                "image extraction requires columns > 0".into(),
            ));
        }
        let columns = columns as usize;
        let rows = match params.get_int("rows")? {
            Some(rows) if rows > 0 => rows as usize,
            Some(_) => {
                return Err(Error::InvalidParameter(
                    "rows must be positive".into(),
                ))
            }
            None => glyph_count.div_ceil(columns),
        };
        if columns * rows < glyph_count {
            return Err(Error::InvalidParameter(
                "grid too small for requested range (columns*rows < glyph count)".into(),
            ));
        }

        let margins = params.get_edges("margins")?;
        let padding = params.get_edges("padding")?;
        let classifier = Classifier {
            fore: params.get_color("fore_color")?.unwrap_or(Rgb::BLACK),
            back: params.get_color("back_color")?.unwrap_or(Rgb::WHITE),
            transparent: params.get_color("transparent_color")?,
            inverse: params.get_bool("inverse", false),
        };
        let proportional = params.get_proportional(false)?;

        let sheet = image::open(input)?.to_rgba8();
        let (img_w, img_h) = (sheet.width() as i32, sheet.height() as i32);

        let usable_w = img_w - margins.left - margins.right;
        let usable_h = img_h - margins.top - margins.bottom;
        if usable_w <= 0 || usable_h <= 0 {
            return Err(Error::InvalidParameter(
                "invalid margins: no drawable area remains".into(),
            ));
        }
        let cell_w = usable_w / columns as i32;
        let cell_h = usable_h / rows as i32;
        if cell_w <= 0 || cell_h <= 0 {
            return Err(Error::InvalidParameter(
                "grid cell size became zero; check margins/rows/columns".into(),
            ));
        }
        let draw_w = cell_w - padding.left - padding.right;
        let draw_h = cell_h - padding.top - padding.bottom;
        if draw_w <= 0 || draw_h <= 0 {
            return Err(Error::InvalidParameter(
                "invalid padding: no drawable area remains inside glyph cell".into(),
            ));
        }

        let mut bitmap = BitmapFont {
            name: Path::new(input)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("image")
                .to_string(),
            first_codepoint: first.into(),
            last_codepoint: last.into(),
            pixel_size: 0,
            ..Default::default()
        };

        for i in 0..glyph_count {
            let col = (i % columns) as i32;
            let row = (i / columns) as i32;
            let start_x = margins.left + col * cell_w + padding.left;
            let start_y = margins.top + row * cell_h + padding.top;

            let mut glyph =
                GlyphBitmap::new(u32::from(first) + i as u32, draw_w as usize, draw_h as usize);
            glyph.bearing_y = draw_h;
            glyph.advance = draw_w;

            for y in 0..draw_h {
                let sy = start_y + y;
                for x in 0..draw_w {
                    let sx = start_x + x;
                    if sx < 0 || sx >= img_w || sy < 0 || sy >= img_h {
                        continue;
                    }
                    let px = *sheet.get_pixel(sx as u32, sy as u32);
                    if classifier.is_foreground(px) {
                        glyph.set_bit(x as usize, y as usize);
                    }
                }
            }

            if proportional {
                super::trim_proportional(&mut glyph);
                glyph.advance = glyph.width as i32;
            }
            bitmap.glyphs.push(glyph);
        }

        bitmap.update_cell_metrics();
        Ok(Font {
            bitmap,
            payload: None,
        })
    }
}
