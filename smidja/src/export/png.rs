//! Renders the glyphs into a PNG proof sheet.
//!
//! Black ink on a white background, one baseline-aligned cell per
//! glyph. With no `columns`/`rows` given the grid is laid out close
//! to square.

use image::GrayImage;

use crate::params::Params;
use crate::pipeline::{Error, Exporter, Font};
use teikna::bitmap::GlyphBitmap;

pub struct PngExporter;

fn nonnegative_param(params: &Params, key: &str) -> Result<usize, Error> {
    match params.get_int(key)? {
        None => Ok(0),
        Some(v) if v >= 0 => Ok(v as usize),
        Some(v) => Err(Error::InvalidParameter(format!(
            "{key} must be nonnegative, got {v}"
        ))),
    }
}

fn grid_shape(glyph_count: usize, columns: usize, rows: usize) -> (usize, usize) {
    match (columns, rows) {
        (0, 0) => {
            let cols = (glyph_count as f64).sqrt().ceil() as usize;
            (cols, glyph_count.div_ceil(cols))
        }
        (0, rows) => (glyph_count.div_ceil(rows), rows),
        (cols, 0) => (cols, glyph_count.div_ceil(cols)),
        shape => shape,
    }
}

fn draw_glyph(sheet: &mut GrayImage, dst_x: i32, dst_y: i32, glyph: &GlyphBitmap) {
    if !glyph.is_well_formed() {
        return;
    }
    let (w, h) = (sheet.width() as i32, sheet.height() as i32);
    for y in 0..glyph.height {
        let yy = dst_y + y as i32;
        if yy < 0 || yy >= h {
            continue;
        }
        for x in 0..glyph.width {
            let xx = dst_x + x as i32;
            if xx < 0 || xx >= w {
                continue;
            }
            if glyph.bit(x, y) {
                sheet.put_pixel(xx as u32, yy as u32, image::Luma([0]));
            }
        }
    }
}

impl Exporter for PngExporter {
    fn name(&self) -> &'static str {
        "png"
    }

    fn export(&self, font: &Font, params: &Params) -> Result<(), Error> {
        let output = super::output_path(params)?;
        let glyphs = &font.bitmap.glyphs;
        if glyphs.is_empty() {
            return Err(Error::InvalidFont("no glyphs to export".into()));
        }

        let padding = nonnegative_param(params, "padding")?;
        let (columns, rows) = grid_shape(
            glyphs.len(),
            nonnegative_param(params, "columns")?,
            nonnegative_param(params, "rows")?,
        );
        if columns * rows < glyphs.len() {
            return Err(Error::InvalidParameter(
                "grid too small for the glyph count (columns*rows < glyph count)".into(),
            ));
        }

        let mut cell_w = font.bitmap.cell_width.max(1);
        let mut max_bearing_y = 0i32;
        let mut min_descender = 0i32;
        for g in glyphs {
            cell_w = cell_w.max(g.width);
            max_bearing_y = max_bearing_y.max(g.bearing_y);
            min_descender = min_descender.min(g.bearing_y - g.height as i32);
        }
        let cell_h = (max_bearing_y - min_descender).max(1) as usize;

        let draw_w = cell_w + padding * 2;
        let draw_h = cell_h + padding * 2;
        let image_w = (columns * draw_w) as u32;
        let image_h = (rows * draw_h) as u32;
        if image_w == 0 || image_h == 0 {
            return Err(Error::InvalidFont("invalid image dimensions".into()));
        }

        let mut sheet = GrayImage::from_pixel(image_w, image_h, image::Luma([255]));
        for (i, glyph) in glyphs.iter().enumerate() {
            let gx = ((i % columns) * draw_w + padding) as i32;
            let gy = ((i / columns) * draw_h + padding) as i32;
            let baseline_y = gy + max_bearing_y;
            draw_glyph(&mut sheet, gx, baseline_y - glyph.bearing_y, glyph);
        }

        sheet.save(output)?;
        log::info!("wrote {image_w}x{image_h} sheet to {output}");
        Ok(())
    }
}
