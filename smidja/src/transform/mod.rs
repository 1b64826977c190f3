//! Transformers: stages that reshape the font between extraction and
//! export.

pub mod bitmap;
pub mod raster;
pub mod tiny;

use crate::params::Params;
use crate::pipeline::Error;
use crate::stream::Flags;
use teikna::font::BitmapFont;

/// Validates the extracted font against the single-byte codepoint
/// space the container format can address.
pub(crate) fn codepoint_range(bitmap: &BitmapFont) -> Result<(u8, u8), Error> {
    if bitmap.glyphs.is_empty() {
        return Err(Error::InvalidFont("bitmap font data missing".into()));
    }
    let (first, last) = (bitmap.first_codepoint, bitmap.last_codepoint);
    if last < first || last > 255 {
        return Err(Error::InvalidFont(format!(
            "invalid codepoint range {first}..{last}"
        )));
    }
    Ok((first as u8, last as u8))
}

/// Header flags from stage parameters. `letter_spacing` (with
/// `spacing_hint` as a fallback key) must fit 0..=15; `space_width`
/// must fit 0..=7 and is required for proportional output.
pub(crate) fn parse_flags(params: &Params) -> Result<Flags, Error> {
    let mut letter_spacing = 0;
    for key in ["letter_spacing", "spacing_hint"] {
        if let Some(v) = params.get_int(key)? {
            if !(0..=15).contains(&v) {
                return Err(Error::InvalidParameter(format!("{key} must be 0..15")));
            }
            letter_spacing = v as u8;
            break;
        }
    }

    let proportional = params.get_proportional(false)?;

    let space_width = match params.get_int("space_width")? {
        Some(v) if (0..=7).contains(&v) => Some(v as u8),
        Some(_) => {
            return Err(Error::InvalidParameter("space_width must be 0..7".into()));
        }
        None => None,
    };
    if proportional && space_width.is_none() {
        return Err(Error::InvalidParameter(
            "space_width is required when proportional=true".into(),
        ));
    }

    Ok(Flags {
        proportional,
        space_width: space_width.unwrap_or(0),
        letter_spacing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_from_parameters() {
        let flags = parse_flags(&Params::parse(
            "font_mode=proportional,space_width=4,letter_spacing=2",
        ))
        .unwrap();
        assert_eq!(
            flags,
            Flags {
                proportional: true,
                space_width: 4,
                letter_spacing: 2,
            }
        );
        assert_eq!(parse_flags(&Params::parse("")).unwrap(), Flags::default());
    }

    #[test]
    fn spacing_hint_is_a_fallback_key() {
        let flags = parse_flags(&Params::parse("spacing_hint=3")).unwrap();
        assert_eq!(flags.letter_spacing, 3);
        let flags = parse_flags(&Params::parse("letter_spacing=1,spacing_hint=9")).unwrap();
        assert_eq!(flags.letter_spacing, 1);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(parse_flags(&Params::parse("letter_spacing=16")).is_err());
        assert!(parse_flags(&Params::parse("space_width=8")).is_err());
        // Proportional output needs an explicit space width.
        assert!(parse_flags(&Params::parse("proportional=1")).is_err());
    }

    #[test]
    fn range_validation() {
        let mut font = BitmapFont {
            first_codepoint: 32,
            last_codepoint: 126,
            glyphs: vec![teikna::bitmap::GlyphBitmap::new(32, 1, 1)],
            ..Default::default()
        };
        assert_eq!(codepoint_range(&font).unwrap(), (32, 126));

        font.last_codepoint = 300;
        assert!(codepoint_range(&font).is_err());

        font.glyphs.clear();
        assert!(codepoint_range(&font).is_err());
    }
}
