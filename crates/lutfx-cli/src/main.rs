//! lutfx - 3D LUT <-> adjustment layer tool
//!
//! Inspects `.cube` files, bakes them into atlas textures and lookup node
//! graphs, and checks the graphs against CPU trilinear interpolation.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use lutfx_ocio::ColorConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "lutfx")]
#[command(author, version, about = "3D LUT <-> adjustment layer converter")]
#[command(long_about = "
Converts between .cube 3D LUT files and compositing node graphs that apply
them as adjustment layers.

Examples:
  lutfx info grade.cube                       # Show LUT info
  lutfx import grade.cube -o out/             # Write atlas EXR + graph JSON
  lutfx import log.cube -o out/ --color-space sRGB
  lutfx resample grade.cube small.cube -s 17  # Re-sample through the graph
  lutfx verify grade.cube -k 32               # Graph vs. trilinear reference
  lutfx --config config.ocio colorspaces
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// OCIO config (defaults to $OCIO, then built-in color spaces)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display LUT information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Bake a LUT into an atlas texture and lookup graph
    Import(ImportArgs),

    /// Import a LUT as adjustment layer and export it at another size
    Resample(ResampleArgs),

    /// Compare graph lookups with CPU trilinear interpolation
    Verify(VerifyArgs),

    /// List color spaces, scene linear first
    #[command(visible_alias = "cs")]
    Colorspaces,
}

#[derive(Args)]
struct InfoArgs {
    /// Input .cube file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

#[derive(Args)]
struct ImportArgs {
    /// Input .cube file
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Color space the LUT expects (default: scene linear)
    #[arg(long)]
    color_space: Option<String>,
}

#[derive(Args)]
struct ResampleArgs {
    /// Input .cube file
    input: PathBuf,

    /// Output .cube file
    output: PathBuf,

    /// Samples per axis of the output
    #[arg(short, long, default_value_t = lutfx_host::DEFAULT_SIZE)]
    size: usize,

    /// Color space the input LUT expects (default: scene linear)
    #[arg(long)]
    color_space: Option<String>,

    /// TITLE of the output file
    #[arg(long, default_value = lutfx_host::EXPORT_TITLE)]
    title: String,
}

#[derive(Args)]
struct VerifyArgs {
    /// Input .cube file
    input: PathBuf,

    /// Test points per axis
    #[arg(short = 'k', long, default_value = "17")]
    samples: usize,

    /// Maximum allowed absolute error
    #[arg(short, long, default_value = "1e-4")]
    tolerance: f32,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "lutfx=warn",
        1 => "lutfx=info",
        _ => "lutfx=debug",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = ColorConfig::discover(cli.config.as_deref()).context("Failed to load OCIO config")?;

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Import(args) => commands::import::run(args, &config, cli.verbose),
        Commands::Resample(args) => commands::resample::run(args, config, cli.verbose),
        Commands::Verify(args) => commands::verify::run(args, &config, cli.verbose),
        Commands::Colorspaces => commands::colorspaces::run(&config, cli.verbose),
    }
}
