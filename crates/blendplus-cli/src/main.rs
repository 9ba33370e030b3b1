//! blendplus - blend an overlay image onto a base image
//!
//! Runs the configure + render pipeline of the BlendPlus effect from the
//! command line.

use anyhow::{Context, Result};
use blendplus_core::Rect;
use blendplus_ops::{BlendMode, Filter, PlacementPolicy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "blendplus")]
#[command(author, version, about = "Blend an overlay image onto a base image")]
#[command(long_about = "
Blends an overlay onto a base image with one of 39 blend modes after
placing it into a selection (fill, fit, stretch or center).

Examples:
  blendplus render photo.png --overlay paper.jpg -o out.png --mode soft-light
  blendplus render photo.png --overlay logo.png -o out.png --placement center --selection 0,0,200,100
  blendplus render photo.png --clipboard-file grab.png -o out.png --swap
  blendplus render photo.png --preset paper.yaml -o out.png
  blendplus modes
  blendplus preset paper.yaml
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Blend an overlay onto a base image
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// List blend modes
    Modes(ModesArgs),

    /// Validate and print a YAML preset
    Preset(PresetArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Base image
    base: PathBuf,

    /// Output image (format from extension)
    #[arg(short, long)]
    output: PathBuf,

    /// Overlay image file
    #[arg(long, conflicts_with = "clipboard_file")]
    overlay: Option<PathBuf>,

    /// Image file served through the in-memory clipboard
    #[arg(long)]
    clipboard_file: Option<PathBuf>,

    /// Blend mode, e.g. multiply, color-burn, "Soft Light"
    #[arg(short, long)]
    mode: Option<BlendMode>,

    /// Placement: fill, fit, stretch, center
    #[arg(short, long)]
    placement: Option<PlacementPolicy>,

    /// Blend the base onto the overlay instead
    #[arg(long)]
    swap: bool,

    /// Selection as x,y,w,h (default: whole image)
    #[arg(long, value_parser = parse_selection)]
    selection: Option<Rect>,

    /// Tile size for parallel rendering
    #[arg(short, long, default_value = "64")]
    tile: u32,

    /// YAML preset; flags given on the command line override it
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Resampling filter: nearest, bilinear, bicubic, lanczos3
    #[arg(short, long, default_value = "bicubic")]
    filter: Filter,
}

#[derive(Args)]
struct ModesArgs {
    /// Print only the kebab-case names
    #[arg(short, long)]
    short: bool,
}

#[derive(Args)]
struct PresetArgs {
    /// Preset file
    preset: PathBuf,
}

fn parse_selection(s: &str) -> Result<Rect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid selection '{s}': {e}"))?;
    match parts.as_slice() {
        &[x, y, w, h] if w > 0 && h > 0 => Ok(Rect::new(x, y, w, h)),
        &[_, _, _, _] => Err(format!("selection '{s}' is empty")),
        _ => Err(format!("selection '{s}' must be x,y,w,h")),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Render(args) => commands::render::run(args, cli.verbose),
        Commands::Modes(args) => commands::modes::run(args),
        Commands::Preset(args) => commands::preset::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1,2,30,40"), Ok(Rect::new(1, 2, 30, 40)));
        assert_eq!(parse_selection(" 0, 0, 5, 5 "), Ok(Rect::new(0, 0, 5, 5)));
        assert!(parse_selection("1,2,0,4").is_err());
        assert!(parse_selection("1,2,3").is_err());
        assert!(parse_selection("a,b,c,d").is_err());
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "blendplus", "-vv", "render", "base.png", "-o", "out.png", "--overlay", "o.jpg",
            "--mode", "Color Burn", "--placement", "fit", "--selection", "0,0,8,8",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.mode, Some(BlendMode::ColorBurn));
        assert_eq!(args.placement, Some(PlacementPolicy::Fit));
        assert_eq!(args.filter, Filter::Bicubic);
        assert_eq!(args.tile, 64);
    }

    #[test]
    fn test_cli_rejects_two_sources() {
        let res = Cli::try_parse_from([
            "blendplus", "render", "b.png", "-o", "o.png", "--overlay", "a.png",
            "--clipboard-file", "c.png",
        ]);
        assert!(res.is_err());
    }
}
