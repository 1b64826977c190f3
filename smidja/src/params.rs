//! Key=value stage parameters.
//!
//! Every pipeline stage is configured through one comma separated
//! `key=value` string passed on the command line, e.g.
//! `input=font.ttf,first_ascii=65,last_ascii=90`. Parsing is lenient:
//! empty entries are skipped and a bare key maps to an empty value.

use thiserror::Error;

/// A parameter value that failed to parse for its expected type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid value '{value}' for parameter '{key}'")]
pub struct ParamError {
    pub key: String,
    pub value: String,
}

/// Left/top/right/bottom pixel counts, for margins and padding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// An sRGB reference color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Squared Euclidean distance to another color.
    pub fn distance_sq(self, other: Rgb) -> i32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        dr * dr + dg * dg + db * db
    }
}

/// Parsed stage parameters. Later occurrences of a key win.
#[derive(Clone, Debug, Default)]
pub struct Params {
    items: Vec<(String, String)>,
}

impl Params {
    /// Parses a `key=value,key=value` string.
    pub fn parse(raw: &str) -> Self {
        let mut items = Vec::new();
        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            match entry.split_once('=') {
                Some((key, value)) => items.push((key.trim().to_string(), value.trim().to_string())),
                None => items.push((entry.to_string(), String::new())),
            }
        }
        Self { items }
    }

    /// Raw value of a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn err(&self, key: &str, value: &str) -> ParamError {
        ParamError {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Boolean parameter. Unset, empty or unrecognized values yield
    /// the default.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None | Some("") => default,
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            Some(_) => default,
        }
    }

    /// Integer parameter, `Ok(None)` when absent or empty.
    pub fn get_int(&self, key: &str) -> Result<Option<i32>, ParamError> {
        match self.get(key) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i32>()
                .map(Some)
                .map_err(|_| self.err(key, raw)),
        }
    }

    /// Four edge parameters sharing a key prefix: `<key>_left`,
    /// `<key>_top`, `<key>_right`, `<key>_bottom`. Missing edges
    /// default to zero.
    pub fn get_edges(&self, key: &str) -> Result<Edges, ParamError> {
        Ok(Edges {
            left: self.get_int(&format!("{key}_left"))?.unwrap_or(0),
            top: self.get_int(&format!("{key}_top"))?.unwrap_or(0),
            right: self.get_int(&format!("{key}_right"))?.unwrap_or(0),
            bottom: self.get_int(&format!("{key}_bottom"))?.unwrap_or(0),
        })
    }

    /// Proportional/fixed rendering mode. An explicit
    /// `font_mode=fixed|proportional` wins over the `proportional`
    /// boolean; any other `font_mode` value is an error.
    pub fn get_proportional(&self, default: bool) -> Result<bool, ParamError> {
        match self.get("font_mode") {
            None | Some("") => Ok(self.get_bool("proportional", default)),
            Some("fixed") => Ok(false),
            Some("proportional") => Ok(true),
            Some(other) => Err(self.err("font_mode", other)),
        }
    }

    /// Hex color parameter, `#RRGGBB` or `RRGGBB`.
    pub fn get_color(&self, key: &str) -> Result<Option<Rgb>, ParamError> {
        let raw = match self.get(key) {
            None | Some("") => return Ok(None),
            Some(raw) => raw,
        };
        let hex = raw.strip_prefix('#').unwrap_or(raw);
        if hex.len() != 6 {
            return Err(self.err(key, raw));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| self.err(key, raw))?;
        Ok(Some(Rgb {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_pairs_and_later_keys_win() {
        let p = Params::parse("input=a.ttf, font_size=16 ,input=b.ttf,flag");
        assert_eq!(p.get("input"), Some("b.ttf"));
        assert_eq!(p.get("font_size"), Some("16"));
        assert_eq!(p.get("flag"), Some(""));
        assert_eq!(p.get("missing"), None);
    }

    #[test]
    fn empty_string_yields_no_params() {
        let p = Params::parse("");
        assert_eq!(p.get("anything"), None);
    }

    #[test]
    fn bool_values() {
        let p = Params::parse("a=1,b=no,c=banana,d=");
        assert!(p.get_bool("a", false));
        assert!(!p.get_bool("b", true));
        assert!(p.get_bool("c", true));
        assert!(p.get_bool("d", true));
        assert!(!p.get_bool("missing", false));
    }

    #[test]
    fn int_values() {
        let p = Params::parse("n=42,bad=x");
        assert_eq!(p.get_int("n"), Ok(Some(42)));
        assert_eq!(p.get_int("missing"), Ok(None));
        assert!(p.get_int("bad").is_err());
    }

    #[test]
    fn edges_gather_prefixed_keys() {
        let p = Params::parse("margins_left=1,margins_bottom=4,padding_top=bad");
        assert_eq!(
            p.get_edges("margins").unwrap(),
            Edges {
                left: 1,
                top: 0,
                right: 0,
                bottom: 4,
            }
        );
        assert_eq!(p.get_edges("missing").unwrap(), Edges::default());
        assert!(p.get_edges("padding").is_err());
    }

    #[test]
    fn font_mode_wins_over_proportional_flag() {
        let p = Params::parse("font_mode=fixed,proportional=1");
        assert_eq!(p.get_proportional(true), Ok(false));
        let p = Params::parse("font_mode=proportional");
        assert_eq!(p.get_proportional(false), Ok(true));
        let p = Params::parse("proportional=yes");
        assert_eq!(p.get_proportional(false), Ok(true));
        let p = Params::parse("font_mode=squished");
        assert!(p.get_proportional(false).is_err());
    }

    #[test]
    fn hex_colors() {
        let p = Params::parse("fore=#ff8000,back=0000ff,bad=#f00");
        assert_eq!(
            p.get_color("fore").unwrap(),
            Some(Rgb {
                r: 255,
                g: 128,
                b: 0,
            })
        );
        assert_eq!(
            p.get_color("back").unwrap(),
            Some(Rgb { r: 0, g: 0, b: 255 })
        );
        assert!(p.get_color("bad").is_err());
    }
}
