//! Exporters: stages that write the final artifact.

pub mod asm;
pub mod bin;
pub mod carray;
pub mod png;

use std::path::Path;

use crate::params::Params;
use crate::pipeline::Error;

/// The `output` parameter every exporter requires.
pub(crate) fn output_path(params: &Params) -> Result<&str, Error> {
    match params.get("output") {
        Some(path) if !path.is_empty() => Ok(path),
        _ => Err(Error::MissingOutput),
    }
}

/// Rewrites a string into a valid C/assembler identifier.
pub(crate) fn sanitize_symbol(value: &str) -> String {
    if value.is_empty() {
        return "font".to_string();
    }
    let mut out: String = value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let first = out.chars().next().unwrap_or('_');
    if !(first.is_ascii_alphabetic() || first == '_') {
        out.insert(0, '_');
    }
    out
}

/// Default symbol name: the output file's stem, sanitized.
pub(crate) fn symbol_from_output(output: &str) -> String {
    let stem = Path::new(output)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    if stem.is_empty() {
        "font".to_string()
    } else {
        sanitize_symbol(stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbols_are_sanitized() {
        assert_eq!(sanitize_symbol("my-font 8x8"), "my_font_8x8");
        assert_eq!(sanitize_symbol("8x8"), "_8x8");
        assert_eq!(sanitize_symbol(""), "font");
        assert_eq!(symbol_from_output("out/c64-font.s"), "c64_font");
    }

    #[test]
    fn output_is_required() {
        assert!(matches!(
            output_path(&Params::parse("")),
            Err(Error::MissingOutput)
        ));
        assert_eq!(output_path(&Params::parse("output=a.bin")).unwrap(), "a.bin");
    }
}
