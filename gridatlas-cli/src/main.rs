//! GridAtlas CLI - generate a map tile pyramid from a region list.

mod error;
mod regions;

use clap::{Parser, ValueEnum};
use error::CliError;
use gridatlas::config::GeneratorConfig;
use gridatlas::generator::{CycleReport, PyramidGenerator};
use gridatlas::logging::init_logging;
use gridatlas::render::{FlatColorRenderer, GradientRenderer, RegionRenderer};
use gridatlas::store::{DiskTileStore, TileImageFormat};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Lossless PNG tiles
    Png,
    /// Lossy JPEG tiles
    Jpeg,
}

impl From<&OutputFormat> for TileImageFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Png => TileImageFormat::Png,
            OutputFormat::Jpeg => TileImageFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum RendererKind {
    /// One flat color per region, keyed by region id
    Flat,
    /// Position-anchored gradient shading
    Gradient,
}

impl RendererKind {
    fn build(&self) -> Arc<dyn RegionRenderer> {
        match self {
            RendererKind::Flat => Arc::new(FlatColorRenderer::new()),
            RendererKind::Gradient => Arc::new(GradientRenderer::new()),
        }
    }
}

#[derive(Parser)]
#[command(name = "gridatlas")]
#[command(about = "Generate a map tile pyramid from a virtual-world region grid", long_about = None)]
#[command(version = gridatlas::VERSION)]
struct Args {
    /// Region list file (JSON: [{ "id", "x", "y", "online"? }, ...])
    #[arg(long)]
    regions: PathBuf,

    /// Output directory for the tile pyramid
    #[arg(long, default_value = "tiles")]
    output: PathBuf,

    /// Tile edge length in pixels (power of two)
    #[arg(long, default_value = "256")]
    tile_size: u32,

    /// Maximum zoom level of the pyramid
    #[arg(long, default_value = "8")]
    max_zoom: u8,

    /// Ocean/background fill color as #RRGGBB
    #[arg(long, default_value = "#1d475f")]
    ocean_color: String,

    /// Finished tile image format
    #[arg(long, value_enum, default_value = "png")]
    format: OutputFormat,

    /// Per-region renderer variant
    #[arg(long, value_enum, default_value = "flat")]
    renderer: RendererKind,

    /// Incremental server mode: cache raw super-tile snapshots between runs
    #[arg(long)]
    server_mode: bool,

    /// Worker cap for parallel cleanup (-1 = fully parallel, 1 = serial)
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    workers: i32,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: String,
}

fn main() {
    let args = Args::parse();

    let _guard = match init_logging(&args.log_dir, "gridatlas.log") {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {}", CliError::Logging(err));
            process::exit(1);
        }
    };

    match run(args) {
        Ok(report) => print_report(&report),
        Err(err) => {
            error!(error = %err, "Generation run failed");
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<CycleReport, CliError> {
    let config = GeneratorConfig::default()
        .with_tile_size(args.tile_size)
        .with_max_zoom(args.max_zoom)
        .with_ocean_color(parse_color(&args.ocean_color)?)
        .with_server_mode(args.server_mode)
        .with_workers(args.workers)
        .with_format((&args.format).into());

    let directory = Arc::new(regions::load_region_file(&args.regions)?);
    let store = Arc::new(DiskTileStore::new(args.output, config.format)?);
    let generator = PyramidGenerator::new(directory, args.renderer.build(), store, config);

    Ok(generator.run_cycle()?)
}

fn print_report(report: &CycleReport) {
    println!("Generation cycle complete:");
    println!("  regions:        {}", report.regions);
    println!("  tree nodes:     {} ({} roots)", report.nodes, report.roots);
    println!(
        "  leaves:         {} rendered, {} reused, {} placeholder",
        report.composite.leaves_rendered,
        report.composite.leaves_reused,
        report.composite.leaves_placeholder
    );
    println!(
        "  tiles written:  {} (+{} raw snapshots)",
        report.composite.tiles_written, report.composite.raw_snapshots_written
    );
    println!(
        "  stale removed:  {}",
        report.cleanup.finished_removed + report.cleanup.raw_removed
    );
    if report.composite.write_failures + report.cleanup.failures > 0 {
        println!(
            "  skipped writes: {} (will retry next cycle)",
            report.composite.write_failures + report.cleanup.failures
        );
    }
}

/// Parse a `#RRGGBB` color argument.
fn parse_color(value: &str) -> Result<[u8; 3], CliError> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CliError::InvalidColor(value.to_string()));
    }
    let channel = |range| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Ok([r, g, b]),
        _ => Err(CliError::InvalidColor(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_with_hash() {
        assert_eq!(parse_color("#1d475f").unwrap(), [29, 71, 95]);
    }

    #[test]
    fn test_parse_color_without_hash() {
        assert_eq!(parse_color("ff0080").unwrap(), [255, 0, 128]);
    }

    #[test]
    fn test_parse_color_rejects_short() {
        assert!(parse_color("#fff").is_err());
    }

    #[test]
    fn test_parse_color_rejects_non_hex() {
        assert!(parse_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_default_ocean_color_matches_config_default() {
        assert_eq!(
            parse_color("#1d475f").unwrap(),
            gridatlas::config::DEFAULT_OCEAN_COLOR
        );
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::parse_from(["gridatlas", "--regions", "world.json"]);
        assert_eq!(args.tile_size, 256);
        assert_eq!(args.max_zoom, 8);
        assert_eq!(args.workers, -1);
        assert!(!args.server_mode);
    }

    #[test]
    fn test_run_generates_pyramid_from_region_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let regions_path = dir.path().join("regions.json");
        std::fs::write(
            &regions_path,
            r#"[
                { "id": "Welcome Island", "x": 10, "y": 10 },
                { "id": "Sandbox", "x": 11, "y": 10 }
            ]"#,
        )
        .unwrap();
        let output = dir.path().join("tiles");

        let args = Args::parse_from([
            "gridatlas",
            "--regions",
            regions_path.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--tile-size",
            "16",
            "--max-zoom",
            "2",
            "--workers",
            "1",
        ]);
        let report = run(args).expect("generation succeeds");

        assert_eq!(report.regions, 2);
        assert_eq!(report.composite.leaves_rendered, 2);
        assert!(output.join("1").join("10_10.png").exists());
        assert!(output.join("2").join("10_10.png").exists());
    }

    #[test]
    fn test_run_fails_on_missing_region_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = Args::parse_from([
            "gridatlas",
            "--regions",
            dir.path().join("absent.json").to_str().unwrap(),
        ]);
        assert!(matches!(run(args), Err(CliError::RegionFile(_))));
    }

    #[test]
    fn test_args_parse_overrides() {
        let args = Args::parse_from([
            "gridatlas",
            "--regions",
            "world.json",
            "--tile-size",
            "128",
            "--max-zoom",
            "4",
            "--format",
            "jpeg",
            "--renderer",
            "gradient",
            "--server-mode",
            "--workers",
            "1",
        ]);
        assert_eq!(args.tile_size, 128);
        assert_eq!(args.max_zoom, 4);
        assert!(args.server_mode);
        assert_eq!(args.workers, 1);
        assert!(matches!(args.format, OutputFormat::Jpeg));
        assert!(matches!(args.renderer, RendererKind::Gradient));
    }
}
