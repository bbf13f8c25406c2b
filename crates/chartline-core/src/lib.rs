//! chartline-core: Pixel-bounded line chart paths (sans-IO).
//!
//! Turns data series into screen-space polylines and reduces them to at
//! most two points per pixel column:
//! layout -> optional step corners / fill closing -> min/max reduction.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! series and returns structured data. Rendering and file output live in
//! `chartline-export` and `chartline-bench`.

pub mod diagnostics;
pub mod path;
pub mod reduce;
pub mod series;
pub mod types;

use std::time::Duration;

use diagnostics::Clock;
pub use path::{PathSegment, PathSource};
pub use reduce::{PathReducer, ReducerKind};
pub use series::ChartLayout;
pub use types::{
    Axis, ChartConfig, ChartError, ChartPath, ChartResult, DataRange, Dimensions, Point, Polyline,
    RenderConfig, Series,
};

/// Range used for an axis when neither the configuration nor the data
/// determine one.
const FALLBACK_RANGE: DataRange = DataRange::new(0.0, 1.0);

/// Lay out and reduce every series of a chart.
///
/// Ranges missing from `config` are derived from the union of all series'
/// samples. Each series is laid out with [`series::build_path`] and then
/// reduced with `config.reducer`, honouring its own [`RenderConfig`].
///
/// # Errors
///
/// Returns [`ChartError::InvalidConfig`] or [`ChartError::InvalidRange`] if
/// `config` fails [`ChartConfig::validate`], and
/// [`ChartError::NonFinitePoint`] or [`ChartError::NonMonotonic`] if a
/// series contains unusable samples.
///
/// # Examples
///
/// ```
/// use chartline_core::{ChartConfig, Dimensions, Point, Series, process};
///
/// let samples = (0..10_000)
///     .map(|i| Point::new(f64::from(i), f64::from(i % 13)))
///     .collect();
/// let config = ChartConfig {
///     dimensions: Dimensions { width: 100, height: 20 },
///     ..ChartConfig::default()
/// };
/// let result = process(&[Series::new("sawtooth", samples)], &config)?;
/// assert!(result.paths[0].polyline.len() <= 2 * 101 + 2);
/// # Ok::<(), chartline_core::ChartError>(())
/// ```
pub fn process(series: &[Series], config: &ChartConfig) -> Result<ChartResult, ChartError> {
    let layout = resolve_layout(series, config)?;

    let paths = series
        .iter()
        .map(|s| chart_series(s, &layout, config.reducer, &NoClock).map(|run| run.path))
        .collect::<Result<Vec<_>, ChartError>>()?;

    Ok(ChartResult {
        paths,
        dimensions: config.dimensions,
    })
}

/// One series after layout and reduction, with the intermediate path and
/// the time each stage took.
pub(crate) struct SeriesRun {
    /// Laid-out path before reduction.
    pub built: Polyline,
    /// Reduced output.
    pub path: ChartPath,
    pub build_duration: Duration,
    pub reduce_duration: Duration,
}

/// Lay out and reduce one series, timing both stages with `clock`.
///
/// Shared by [`process`] and
/// [`process_with_diagnostics`](diagnostics::process_with_diagnostics).
pub(crate) fn chart_series<C: Clock>(
    series: &Series,
    layout: &ChartLayout,
    reducer: ReducerKind,
    clock: &C,
) -> Result<SeriesRun, ChartError> {
    let t = clock.now();
    let built = crate::series::build_path(series, layout)?;
    let build_duration = clock.elapsed(&t);

    let t = clock.now();
    let polyline = reducer.reduce(&built, &series.config);
    let reduce_duration = clock.elapsed(&t);

    log::debug!(
        "series {:?}: {} samples, {} path points -> {} reduced",
        series.name,
        series.points.len(),
        built.len(),
        polyline.len(),
    );

    Ok(SeriesRun {
        built,
        path: ChartPath {
            name: series.name.clone(),
            config: series.config,
            polyline,
        },
        build_duration,
        reduce_duration,
    })
}

/// Clock for untimed runs.
struct NoClock;

impl Clock for NoClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _: &()) -> Duration {
        Duration::ZERO
    }
}

/// Validate `config` and fill in any ranges it leaves open.
pub(crate) fn resolve_layout(
    series: &[Series],
    config: &ChartConfig,
) -> Result<ChartLayout, ChartError> {
    config.validate()?;

    let bounds = series::data_bounds(series);
    let x_range = config
        .x_range
        .or_else(|| bounds.map(|(x, _)| x))
        .unwrap_or(FALLBACK_RANGE);
    let y_range = config
        .y_range
        .or_else(|| bounds.map(|(_, y)| y))
        .unwrap_or(FALLBACK_RANGE);

    log::trace!(
        "layout x=[{}, {}] y=[{}, {}] on {}x{}",
        x_range.min,
        x_range.max,
        y_range.min,
        y_range.max,
        config.dimensions.width,
        config.dimensions.height,
    );

    ChartLayout::new(x_range, y_range, config.dimensions)
}
