//! SDCC-style assembly listing of a tiny container stream.
//!
//! Every byte of the stream appears as a `.db` (offsets as `.dw`)
//! with a comment decoding it, so the output doubles as documentation
//! of the format.

use std::fmt::Write as _;
use std::fs;

use crate::params::Params;
use crate::pipeline::{Error, Exporter, Font, Payload};
use crate::stream::{FontStream, HEADER_LEN};
use teikna::tiny::{Color, Move};

pub struct AsmExporter;

const INDENT: &str = "        ";

fn push_db(out: &mut String, value: u8, comment: &str) {
    let _ = writeln!(out, "{INDENT}.db {value:<20}; {comment}");
}

fn push_dw_line(out: &mut String, values: &[u16]) {
    let words: Vec<String> = values.iter().map(|v| format!("0x{v:04X}")).collect();
    let _ = writeln!(out, "{INDENT}.dw {}", words.join(", "));
}

fn move_comment(byte: u8) -> String {
    let mv = Move::from_byte(byte);
    let color = match mv.color {
        Color::None => "none (move only!)",
        Color::Clear => "back (clear)",
        Color::Set => "fore (set)",
        Color::Toggle => "xor (toggle)",
    };
    format!("move dx={}, dy={}, color={color}", mv.dx, mv.dy)
}

fn glyph_label(codepoint: u32) -> String {
    match codepoint {
        127 => "<non standard>".to_string(),
        39 => "'''".to_string(),
        32..=126 => format!("'{}'", char::from(codepoint as u8)),
        _ => "'?'".to_string(),
    }
}

fn render(stream: &FontStream, module: &str, symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{INDENT};;  {module}.s");
    let _ = writeln!(out, "{INDENT};;  ");
    let _ = writeln!(out, "{INDENT};;  {module}");
    let _ = writeln!(out, "{INDENT};; ");
    let _ = writeln!(out, "{INDENT};;  notes: see font.h for format details");
    let _ = writeln!(out, "{INDENT};;  ");
    let _ = writeln!(out, "{INDENT};;  generated by smidja");
    let _ = writeln!(out, "{INDENT}.module {module}\n");
    let _ = writeln!(out, "{INDENT}.globl _{symbol}\n");
    let _ = writeln!(out, "{INDENT}.area _CODE");
    let _ = writeln!(out, "_{symbol}::");

    let _ = writeln!(out, "{INDENT};; font header");
    push_db(
        &mut out,
        stream.flags.to_byte(),
        "font flags (bit7 prop, bits4-6 space width, bits0-3 letter spacing)",
    );
    push_db(
        &mut out,
        (stream.max_width.clamp(1, 256) - 1) as u8,
        "width (max width for proportional)",
    );
    push_db(&mut out, (stream.max_height.clamp(1, 256) - 1) as u8, "height");
    push_db(&mut out, stream.first_codepoint, "first ascii");
    push_db(&mut out, stream.last_codepoint, "last ascii");
    out.push('\n');

    let mut offsets = Vec::with_capacity(stream.glyphs.len());
    let mut offset = (HEADER_LEN + stream.glyphs.len() * 2) as u16;
    for glyph in &stream.glyphs {
        offsets.push(offset);
        offset = offset.wrapping_add(4 + glyph.payload.len() as u16);
    }

    let _ = writeln!(out, "{INDENT};; glyph offsets");
    for chunk in offsets.chunks(8) {
        push_dw_line(&mut out, chunk);
    }
    out.push('\n');

    for (i, glyph) in stream.glyphs.iter().enumerate() {
        let codepoint = u32::from(stream.first_codepoint) + i as u32;
        let _ = writeln!(out, "{INDENT};; ascii {codepoint}: {}", glyph_label(codepoint));
        push_db(&mut out, glyph.class << 5, "class(bits 5-7)");
        push_db(&mut out, (glyph.width.clamp(1, 256) - 1) as u8, "width");
        push_db(&mut out, (glyph.height.clamp(1, 256) - 1) as u8, "height");

        if glyph.payload.is_empty() {
            push_db(&mut out, 0, "# moves");
            continue;
        }
        push_db(&mut out, glyph.count() as u8, "# moves");
        push_db(&mut out, glyph.payload[0], "x origin");
        push_db(&mut out, glyph.payload[1], "y origin");
        for &byte in &glyph.payload[2..] {
            push_db(&mut out, byte, &move_comment(byte));
        }
    }
    out
}

impl Exporter for AsmExporter {
    fn name(&self) -> &'static str {
        "asm"
    }

    fn export(&self, font: &Font, params: &Params) -> Result<(), Error> {
        let output = super::output_path(params)?;
        let Some(Payload::TinyStream(bytes)) = &font.payload else {
            return Err(Error::InvalidFont(
                "asm export requires tiny move data; run the tiny transformer first".into(),
            ));
        };
        let stream = FontStream::parse(bytes)?;

        let module = match params.get("module") {
            Some(v) if !v.is_empty() => super::sanitize_symbol(v),
            _ => super::symbol_from_output(output),
        };
        let symbol = match params.get("symbol") {
            Some(v) if !v.is_empty() => super::sanitize_symbol(v),
            _ => module.clone(),
        };

        fs::write(output, render(&stream, &module, &symbol))?;
        Ok(())
    }
}
