//! bitmap font conversion tool
//!
//! Runs a three stage pipeline: extract glyph rasters from a font or
//! image, optionally transform them (vectorize, pack, rasterize), and
//! export the result.

use clap::Parser;
use smidja::Options;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Extractor stage: ttf, image or tinybin. Inferred from the
    /// input file extension when omitted.
    #[arg(short = 'e', long)]
    extractor: Option<String>,

    /// Extractor parameters, e.g. "input=font.ttf,font_size=16"
    #[arg(long, default_value = "")]
    extractor_parameters: String,

    /// Optional transformer stage: tiny, bitmap or raster
    #[arg(short = 't', long)]
    transformer: Option<String>,

    /// Transformer parameters, e.g. "optimize=1,letter_spacing=1"
    #[arg(long, default_value = "")]
    transformer_parameters: String,

    /// Exporter stage: bin, asm, carray or png
    #[arg(short = 'x', long)]
    exporter: String,

    /// Exporter parameters, e.g. "output=font.bin"
    #[arg(long, default_value = "")]
    exporter_parameters: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let options = Options {
        extractor: args.extractor,
        extractor_parameters: args.extractor_parameters,
        transformer: args.transformer,
        transformer_parameters: args.transformer_parameters,
        exporter: args.exporter,
        exporter_parameters: args.exporter_parameters,
    };

    if let Err(e) = smidja::run(&options) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
