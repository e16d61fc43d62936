use std::{
    ops::ControlFlow,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use panostitch::{
    CubeFace, CubeFaces, CubeRequirement, DEFAULT_JPEG_QUALITY, ExportFormat, LatitudeSpan,
    MIN_RING_IMAGES, ProjectionEngine, RingImages, RunConfig, SharedRaster, SourceSet, Variant,
};

#[derive(Parser, Debug)]
#[command(name = "panostitch", version)]
struct Cli {
    /// Log verbosity: -v info, -vv debug, -vvv trace.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stitch six cube faces into an equirectangular panorama.
    Cube(CubeArgs),
    /// Stitch photos evenly spaced around the horizon.
    Ring(RingArgs),
}

#[derive(Args, Debug)]
struct CubeArgs {
    #[arg(long)]
    front: Option<PathBuf>,
    #[arg(long)]
    back: Option<PathBuf>,
    #[arg(long)]
    left: Option<PathBuf>,
    #[arg(long)]
    right: Option<PathBuf>,
    #[arg(long)]
    top: Option<PathBuf>,
    #[arg(long)]
    bottom: Option<PathBuf>,

    /// Only require front/back/left/right; missing top/bottom render as background.
    #[arg(long)]
    sides_only: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct RingArgs {
    /// Ring images in yaw order (repeat the flag for each image).
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,

    /// Minimum number of images required to start.
    #[arg(long)]
    min_images: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Run configuration JSON; the flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (defaults to width / 2).
    #[arg(long)]
    height: Option<u32>,

    /// Rows rendered between progress checkpoints.
    #[arg(long)]
    chunk_rows: Option<u32>,

    /// How output rows map onto latitude.
    #[arg(long, value_enum)]
    latitude: Option<LatitudeArg>,

    /// Allow output that is not 2:1.
    #[arg(long, default_value_t = false)]
    any_aspect: bool,

    /// Render row chunks on a thread pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Output path (defaults to `360-panorama-<timestamp>.<ext>` in the current directory).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format (defaults to the `--out` extension, else JPEG).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// JPEG quality, 1-100.
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LatitudeArg {
    PoleToPole,
    HalfOpen,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Cube(args) => cmd_cube(args),
        Command::Ring(args) => cmd_ring(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_cube(args: CubeArgs) -> anyhow::Result<()> {
    let mut cfg = base_config(&args.output)?;
    let requirement = match (args.sides_only, cfg.variant) {
        (true, _) => CubeRequirement::SidesOnly,
        (false, Variant::Cube { requirement }) => requirement,
        (false, Variant::Ring { .. }) => CubeRequirement::AllSix,
    };
    cfg.variant = Variant::Cube { requirement };

    let slots = [
        (CubeFace::Front, &args.front),
        (CubeFace::Back, &args.back),
        (CubeFace::Left, &args.left),
        (CubeFace::Right, &args.right),
        (CubeFace::Top, &args.top),
        (CubeFace::Bottom, &args.bottom),
    ];
    let mut faces = CubeFaces::new();
    for (face, path) in slots {
        if let Some(path) = path {
            faces.insert(face, load_shared(path)?);
        }
    }

    stitch(cfg, SourceSet::Cube(faces), &args.output)
}

fn cmd_ring(args: RingArgs) -> anyhow::Result<()> {
    let mut cfg = base_config(&args.output)?;
    let min_images = match (args.min_images, cfg.variant) {
        (Some(n), _) => n,
        (None, Variant::Ring { min_images }) => min_images,
        (None, Variant::Cube { .. }) => MIN_RING_IMAGES,
    };
    cfg.variant = Variant::Ring { min_images };

    let images = args
        .images
        .iter()
        .map(|p| load_shared(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    stitch(cfg, SourceSet::Ring(RingImages::new(images)), &args.output)
}

fn base_config(args: &OutputArgs) -> anyhow::Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::from_json_path(path)?,
        None => RunConfig::default(),
    };
    if let Some(width) = args.width {
        cfg.width = width;
        cfg.height = width / 2;
    }
    if let Some(height) = args.height {
        cfg.height = height;
    }
    if let Some(chunk_rows) = args.chunk_rows {
        cfg.chunk_rows = chunk_rows;
    }
    if let Some(latitude) = args.latitude {
        cfg.latitude = match latitude {
            LatitudeArg::PoleToPole => LatitudeSpan::PoleToPole,
            LatitudeArg::HalfOpen => LatitudeSpan::HalfOpen,
        };
    }
    if args.any_aspect {
        cfg.strict_aspect = false;
    }
    Ok(cfg)
}

fn load_shared(path: &Path) -> anyhow::Result<SharedRaster> {
    Ok(Arc::new(panostitch::load_image(path)?))
}

fn stitch(cfg: RunConfig, sources: SourceSet, args: &OutputArgs) -> anyhow::Result<()> {
    let engine = ProjectionEngine::new(cfg, &sources)?;

    let outcome = if args.parallel {
        engine.render_parallel(args.threads)?
    } else {
        engine.drive(|checkpoint| {
            tracing::info!(
                percent = (checkpoint.fraction_done() * 100.0).round(),
                "stitching"
            );
            ControlFlow::Continue(())
        })
    };

    let format = match (args.format, &args.out) {
        (Some(FormatArg::Png), _) => ExportFormat::Png,
        (Some(FormatArg::Jpeg), _) => ExportFormat::Jpeg {
            quality: args.quality,
        },
        (None, Some(out)) => match ExportFormat::from_path(out) {
            Some(ExportFormat::Jpeg { .. }) | None => ExportFormat::Jpeg {
                quality: args.quality,
            },
            Some(other) => other,
        },
        (None, None) => ExportFormat::Jpeg {
            quality: args.quality,
        },
    };
    let out = args.out.clone().unwrap_or_else(|| {
        PathBuf::from(panostitch::default_output_name(
            format,
            chrono::Utc::now(),
        ))
    });

    panostitch::write_raster(&outcome.raster, &out, format)
        .with_context(|| format!("export panorama to '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}
