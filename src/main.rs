use clap::{Args, Parser, Subcommand};
use magickpipe::{Dialect, FsByteSource, Pipeline, SystemLauncher};
use std::path::PathBuf;

/// Shared flags for commands that talk to the external tool.
#[derive(Args, Clone)]
struct DialectArgs {
    /// Target ImageMagick (`convert`) instead of GraphicsMagick (`gm`)
    #[arg(long)]
    imagemagick: bool,
}

impl DialectArgs {
    fn dialect(&self) -> Dialect {
        if self.imagemagick {
            Dialect::ImageMagick
        } else {
            Dialect::GraphicsMagick
        }
    }
}

#[derive(Parser)]
#[command(name = "magickpipe")]
#[command(about = "Compile image transformations into gm/convert invocations")]
#[command(long_about = "\
Compile image transformations into gm/convert invocations

Operations queue at fixed priorities (resize before background before
gravity before crop, and so on) and render in that order regardless of
flag order on the command line. `measure` never spawns a process — it
reads dimensions straight out of the file's header bytes.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read pixel dimensions from the file's header bytes (jpg/png/gif/svg)
    Measure {
        file: PathBuf,
        /// Emit JSON instead of WxH text
        #[arg(long)]
        json: bool,
    },
    /// Ask the external tool for format and dimensions
    Identify {
        file: PathBuf,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        dialect: DialectArgs,
    },
    /// Build and run a transformation pipeline over one image
    Convert(ConvertArgs),
}

#[derive(Args)]
struct ConvertArgs {
    input: PathBuf,

    /// Output file (defaults to transforming the input in place)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Resize to WxH, preserving aspect ratio
    #[arg(long, value_name = "WxH", value_parser = parse_geometry)]
    resize: Option<(u32, u32)>,

    /// Fill-and-crop thumbnail to exactly WxH
    #[arg(long, value_name = "WxH", value_parser = parse_geometry)]
    thumbnail: Option<(u32, u32)>,

    /// Pad-to-exact-size miniature at WxH
    #[arg(long, value_name = "WxH", value_parser = parse_geometry)]
    pad: Option<(u32, u32)>,

    /// Background color for thumbnail/pad compositing
    #[arg(long)]
    background: Option<String>,

    /// Encoding quality in percent
    #[arg(long)]
    quality: Option<u32>,

    /// Rotate by degrees
    #[arg(long)]
    rotate: Option<i32>,

    /// Gaussian blur radius
    #[arg(long)]
    blur: Option<f64>,

    #[arg(long)]
    grayscale: bool,
    #[arg(long)]
    sepia: bool,
    #[arg(long)]
    normalize: bool,
    #[arg(long)]
    flip: bool,
    #[arg(long)]
    flop: bool,
    /// Strip embedded profiles (EXIF, ICC)
    #[arg(long)]
    minify: bool,

    /// Print the compiled command instead of executing it
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    dialect: DialectArgs,
}

/// Parse `WxH` into a dimension pair.
fn parse_geometry(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got {value:?}"))?;
    let w = w.parse().map_err(|_| format!("bad width in {value:?}"))?;
    let h = h.parse().map_err(|_| format!("bad height in {value:?}"))?;
    Ok((w, h))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Measure { file, json } => {
            let pipe = Pipeline::from_file(&file, Dialect::GraphicsMagick);
            match pipe.measure(&FsByteSource::new())? {
                Some(dims) if json => println!("{}", serde_json::to_string(&dims)?),
                Some(dims) => println!("{}x{}", dims.width, dims.height),
                None => return Err(format!("{}: dimensions not found", file.display()).into()),
            }
        }
        Command::Identify {
            file,
            json,
            dialect,
        } => {
            let pipe = Pipeline::from_file(&file, dialect.dialect());
            let info = pipe.identify(&SystemLauncher::new())?;
            if json {
                println!("{}", serde_json::to_string(&info)?);
            } else {
                println!("{} {}x{}", info.format, info.width, info.height);
            }
        }
        Command::Convert(args) => run_convert(args)?,
    }

    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipe = Pipeline::from_file(&args.input, args.dialect.dialect());
    let background = args.background.as_deref();

    if let Some((w, h)) = args.resize {
        pipe.resize(Some(w), Some(h), "");
    }
    if let Some((w, h)) = args.thumbnail {
        pipe.resize_center(w, h, background);
    }
    if let Some((w, h)) = args.pad {
        pipe.miniature(w, h, background);
    }
    if let Some(quality) = args.quality {
        pipe.quality(quality);
    }
    if let Some(degrees) = args.rotate {
        pipe.rotate(degrees);
    }
    if let Some(radius) = args.blur {
        pipe.blur(radius);
    }
    if args.grayscale {
        pipe.grayscale();
    }
    if args.sepia {
        pipe.sepia();
    }
    if args.normalize {
        pipe.normalize();
    }
    if args.flip {
        pipe.flip();
    }
    if args.flop {
        pipe.flop();
    }
    if args.minify {
        pipe.minify();
    }

    if pipe.operations().is_empty() {
        return Err("no operations given; see --help for transform flags".into());
    }

    let out = args.out.as_deref();
    if args.dry_run {
        let target = out.unwrap_or(&args.input);
        println!("{}", pipe.shell_command(&target.display().to_string()));
        return Ok(());
    }

    let written = pipe.save(&SystemLauncher::new(), out)?;
    println!("wrote {}", written.display());
    Ok(())
}
