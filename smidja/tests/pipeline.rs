//! End-to-end pipeline runs over a generated glyph sheet.
//!
//! Drives [`smidja::run`] the way the command line does: slice
//! glyphs out of an image, vectorize them into a tiny stream, write
//! it out, then load the stream back and rasterize it again.

use image::{Rgba, RgbaImage};
use smidja::{run, Options};
use tempfile::TempDir;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A 2x1 grid of 4x4 cells holding crude 'A' and 'B' shapes.
fn write_sheet(path: &std::path::Path) {
    let mut img = RgbaImage::from_pixel(8, 4, PAPER);
    for (x, y) in [(1, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2), (0, 3), (2, 3)] {
        img.put_pixel(x, y, INK);
    }
    for (x, y) in [(4, 0), (5, 0), (4, 1), (6, 1), (4, 2), (5, 2), (4, 3), (6, 3)] {
        img.put_pixel(x, y, INK);
    }
    img.save(path).unwrap();
}

#[test]
fn image_to_tiny_stream_and_back() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.png");
    let stream = dir.path().join("glyphs.bin");
    write_sheet(&sheet);

    // Extract from the sheet, vectorize, export the container stream.
    run(&Options {
        extractor: None, // inferred from the .png extension
        extractor_parameters: format!(
            "input={},first_ascii=65,last_ascii=66,columns=2",
            sheet.display()
        ),
        transformer: Some("tiny".into()),
        transformer_parameters: "letter_spacing=1".into(),
        exporter: "bin".into(),
        exporter_parameters: format!("output={}", stream.display()),
    })
    .unwrap();

    let bytes = std::fs::read(&stream).unwrap();
    // Header: flags with letter spacing 1, 4x4 cells, range 65..=66.
    assert_eq!(&bytes[..5], &[0x01, 3, 3, 65, 66]);

    // Load the stream back and rebuild the rasters as a proof sheet.
    let proof = dir.path().join("proof.png");
    run(&Options {
        extractor: Some("tinybin".into()),
        extractor_parameters: format!("input={}", stream.display()),
        transformer: Some("raster".into()),
        transformer_parameters: String::new(),
        exporter: "png".into(),
        exporter_parameters: format!("output={},columns=2", proof.display()),
    })
    .unwrap();

    // The rasterized proof sheet must reproduce the original ink.
    let original = image::open(&sheet).unwrap().to_luma8();
    let rendered = image::open(&proof).unwrap().to_luma8();
    assert_eq!(rendered.dimensions(), (8, 4));
    for y in 0..4 {
        for x in 0..8 {
            assert_eq!(
                rendered.get_pixel(x, y).0[0] < 128,
                original.get_pixel(x, y).0[0] < 128,
                "pixel ({x}, {y}) differs"
            );
        }
    }
}

#[test]
fn asm_listing_from_a_ttf_less_pipeline() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.png");
    let listing = dir.path().join("font.s");
    write_sheet(&sheet);

    run(&Options {
        extractor: Some("image".into()),
        extractor_parameters: format!(
            "input={},first_ascii=65,last_ascii=66,columns=2",
            sheet.display()
        ),
        transformer: Some("tiny".into()),
        transformer_parameters: String::new(),
        exporter: "asm".into(),
        exporter_parameters: format!("output={},symbol=sheet_font", listing.display()),
    })
    .unwrap();

    let text = std::fs::read_to_string(&listing).unwrap();
    assert!(text.contains("_sheet_font::"));
    assert!(text.contains(";; ascii 65: 'A'"));
    assert!(text.contains(";; ascii 66: 'B'"));
    assert!(text.contains("color=fore (set)"));
}

#[test]
fn unknown_stage_fails_cleanly() {
    let err = run(&Options {
        extractor: Some("dlopen".into()),
        extractor_parameters: "input=x.ttf".into(),
        transformer: None,
        transformer_parameters: String::new(),
        exporter: "bin".into(),
        exporter_parameters: String::new(),
    })
    .unwrap_err();
    assert_eq!(err.to_string(), "unknown extractor 'dlopen'");
}
