//! chartline-bench: CLI tool for measuring chart path reduction.
//!
//! Lays out one or more data series on a chart of a given size, reduces
//! them, and prints per-series timing and point counts. Useful for:
//!
//! - Seeing how many points a reducer saves for a given chart width
//! - Checking that reduced output renders the same as the full path
//!   (`--compare`)
//! - Exporting the reduced chart as SVG or PNG for inspection
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin chartline-bench -- [OPTIONS] [SERIES_JSON]
//! cargo run --release --bin chartline-bench -- --synthetic 1000000 --compare
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use chartline_core::diagnostics::{ChartDiagnostics, Clock, process_with_diagnostics};
use chartline_core::{ChartConfig, ChartError, ChartResult, Dimensions, Point, ReducerKind, Series};
use clap::{Parser, ValueEnum};

/// Chart path reduction diagnostics.
///
/// Lays out and reduces the given series with configurable chart size and
/// reducer, then prints per-series timing and point counts.
#[derive(Parser)]
#[command(name = "chartline-bench", version)]
struct Cli {
    /// JSON file holding an array of series
    /// (`[{"name": ..., "points": [{"x": .., "y": ..}, ..]}, ..]`).
    #[arg(required_unless_present = "synthetic", conflicts_with = "synthetic")]
    input: Option<PathBuf>,

    /// Generate one synthetic series with this many samples instead of
    /// reading a file.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    synthetic: Option<u32>,

    /// Chart width in pixels.
    #[arg(long, default_value_t = ChartConfig::DEFAULT_WIDTH, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = ChartConfig::DEFAULT_HEIGHT, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: u32,

    /// Draw every series stepped.
    #[arg(long)]
    stepped: bool,

    /// Draw every series filled.
    #[arg(long)]
    filled: bool,

    /// Reduction strategy.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_REDUCER)]
    reducer: Reducer,

    /// Full chart config as a JSON string.
    ///
    /// When provided, `--width`, `--height` and `--reducer` are ignored.
    /// The JSON must be a valid `ChartConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Write the reduced chart as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the reduced chart as PNG.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Render both the full and the reduced chart and report how many
    /// pixels differ.
    #[arg(long)]
    compare: bool,

    /// Log debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only.
    #[arg(short, long)]
    quiet: bool,
}

/// Reduction strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Reducer {
    /// Keep the lowest and highest point of every pixel column.
    MinMax,
    /// Keep every point.
    Passthrough,
}

/// Maps a [`ReducerKind`] to the local CLI [`Reducer`] enum.
const fn reducer_from_core(kind: ReducerKind) -> Reducer {
    match kind {
        ReducerKind::MinMax => Reducer::MinMax,
        ReducerKind::Passthrough => Reducer::Passthrough,
    }
}

/// The CLI default reducer, derived from [`ChartConfig::DEFAULT_REDUCER`]
/// so the two cannot silently diverge.
const CLI_DEFAULT_REDUCER: Reducer = reducer_from_core(ChartConfig::DEFAULT_REDUCER);

/// Errors that end a bench run.
#[derive(Debug, thiserror::Error)]
enum BenchError {
    #[error("error parsing --config-json: {0}")]
    ConfigJson(#[source] serde_json::Error),

    #[error("error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error parsing series from {}: {source}", path.display())]
    SeriesJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("error serializing diagnostics: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("error writing {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("cannot render a {0}x{1} chart")]
    Render(u32, u32),
}

/// Build a [`ChartConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual chart flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<ChartConfig, BenchError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(BenchError::ConfigJson);
    }

    Ok(ChartConfig {
        dimensions: Dimensions {
            width: cli.width,
            height: cli.height,
        },
        reducer: match cli.reducer {
            Reducer::MinMax => ReducerKind::MinMax,
            Reducer::Passthrough => ReducerKind::Passthrough,
        },
        ..ChartConfig::default()
    })
}

/// Load the series named on the command line, or generate one, and apply
/// the `--stepped` / `--filled` overrides.
fn series_from_cli(cli: &Cli) -> Result<Vec<Series>, BenchError> {
    let mut series = match (cli.synthetic, &cli.input) {
        (Some(samples), _) => vec![synthetic_series(samples)],
        (None, Some(path)) => read_series(path)?,
        // clap enforces one of the two.
        (None, None) => Vec::new(),
    };

    for s in &mut series {
        s.config.stepped |= cli.stepped;
        s.config.filled |= cli.filled;
    }
    Ok(series)
}

fn read_series(path: &Path) -> Result<Vec<Series>, BenchError> {
    let text = std::fs::read_to_string(path).map_err(|source| BenchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| BenchError::SeriesJson {
        path: path.to_path_buf(),
        source,
    })
}

/// A dense, deterministic signal: a slow sine, a fast sine and
/// pseudo-random jitter, sampled at unit intervals.
fn synthetic_series(samples: u32) -> Series {
    // xorshift64; any fixed non-zero seed works.
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let points = (0..samples)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            #[allow(clippy::cast_precision_loss)]
            let jitter = (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5;
            let t = f64::from(i);
            let slow = (t / 5000.0).sin();
            let fast = (t / 37.0).sin() * 0.3;
            Point::new(t, 0.2f64.mul_add(jitter, slow + fast))
        })
        .collect();
    Series::new("synthetic", points)
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), BenchError> {
    let config = config_from_cli(cli)?;
    let series = series_from_cli(cli)?;

    log::info!(
        "Series: {} ({} samples)",
        series.len(),
        series.iter().map(|s| s.points.len()).sum::<usize>(),
    );
    log::info!("Config: {config:?}");
    log::info!("Runs: {}", cli.runs);

    let mut all_diagnostics = Vec::with_capacity(cli.runs);
    let mut first_result = None;

    for run in 0..cli.runs {
        if cli.runs > 1 {
            log::info!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let (result, diagnostics) = process_with_diagnostics(&series, &config, &StdClock)?;

        if cli.json {
            let json = serde_json::to_string_pretty(&diagnostics).map_err(BenchError::Serialize)?;
            println!("{json}");
        } else {
            println!("{}", diagnostics.report());
        }

        if first_result.is_none() {
            first_result = Some(result);
        }
        all_diagnostics.push(diagnostics);
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    // Outputs are written from the first run only.
    let Some(result) = first_result else {
        return Ok(());
    };

    if let Some(ref svg_path) = cli.svg {
        write_svg(svg_path, &result, &config, cli)?;
    }

    if let Some(ref png_path) = cli.png {
        let pixmap = render::render_chart(&result)
            .ok_or(BenchError::Render(result.dimensions.width, result.dimensions.height))?;
        pixmap.save_png(png_path).map_err(|e| BenchError::Write {
            path: png_path.clone(),
            message: e.to_string(),
        })?;
        log::info!("PNG written to {}", png_path.display());
    }

    if cli.compare {
        compare_with_full(&series, &config, &result, cli.json)?;
    }

    Ok(())
}

fn write_svg(
    path: &Path,
    result: &ChartResult,
    config: &ChartConfig,
    cli: &Cli,
) -> Result<(), BenchError> {
    let title = cli
        .input
        .as_deref()
        .and_then(Path::file_stem)
        .and_then(|s| s.to_str())
        .unwrap_or("chartline");
    let desc = format!("{} points after {:?} reduction", result.point_count(), config.reducer);
    let config_json = serde_json::to_string(config).map_err(BenchError::Serialize)?;
    let metadata = chartline_export::SvgMetadata {
        title: Some(title),
        description: Some(&desc),
        config_json: Some(&config_json),
    };

    let svg = chartline_export::to_svg(result, &metadata);
    std::fs::write(path, &svg).map_err(|e| BenchError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    log::info!("SVG written to {} ({} bytes)", path.display(), svg.len());
    Ok(())
}

/// Render the unreduced chart next to `reduced` and report the difference.
fn compare_with_full(
    series: &[Series],
    config: &ChartConfig,
    reduced: &ChartResult,
    json: bool,
) -> Result<(), BenchError> {
    let full_config = ChartConfig {
        reducer: ReducerKind::Passthrough,
        ..config.clone()
    };
    let full = chartline_core::process(series, &full_config)?;

    let render_error = || BenchError::Render(config.dimensions.width, config.dimensions.height);
    let full_pixmap = render::render_chart(&full).ok_or_else(render_error)?;
    let reduced_pixmap = render::render_chart(reduced).ok_or_else(render_error)?;
    let diff = render::compare(&full_pixmap, &reduced_pixmap);

    if json {
        let value = serde_json::json!({
            "full_points": full.point_count(),
            "reduced_points": reduced.point_count(),
            "pixels": diff.total,
            "differing_pixels": diff.differing,
            "significant_pixels": diff.significant,
        });
        println!("{value}");
    } else {
        println!();
        println!("Fidelity\n{}", "=".repeat(60));
        println!(
            "Points: {} -> {}",
            full.point_count(),
            reduced.point_count()
        );
        println!(
            "Pixels differing: {} of {} ({} significant, {:.3}%)",
            diff.differing,
            diff.total,
            diff.significant,
            diff.significant_ratio() * 100.0,
        );
    }
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[ChartDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-series mean reduce time.
    println!();
    println!("{:<24} {:>12}", "Series", "Reduce (ms)");
    println!("{}", "-".repeat(40));

    let series_count = all_diagnostics[0].series.len();
    for index in 0..series_count {
        let reduce_ms: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(|d| d.series.get(index))
            .map(|s| s.reduce_duration.as_secs_f64() * 1000.0)
            .collect();
        let name = &all_diagnostics[0].series[index].name;
        let mean = reduce_ms.iter().sum::<f64>() / reduce_ms.len() as f64;
        println!("{name:<24} {mean:>10.3}ms");
    }
}
