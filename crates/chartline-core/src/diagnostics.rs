//! Chart diagnostics: timing and point counts for each series.
//!
//! Collected by [`process_with_diagnostics`] alongside the chart result,
//! for tuning chart sizes and checking how much a reducer saves.
//!
//! Time is read through the caller-supplied [`Clock`] so this crate stays
//! free of platform time sources.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{ChartConfig, ChartError, ChartResult, Polyline, Series};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single chart run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDiagnostics {
    /// Per-series metrics, in input order.
    pub series: Vec<SeriesDiagnostics>,
    /// Total wall-clock duration, including range resolution (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all series.
    pub summary: ChartSummary,
}

/// Metrics for one series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesDiagnostics {
    /// Series name.
    pub name: String,
    /// Whether the series was drawn stepped (and therefore not reduced).
    pub stepped: bool,
    /// Whether the series was drawn filled.
    pub filled: bool,
    /// Time spent laying out the path (seconds).
    #[serde(with = "duration_serde")]
    pub build_duration: Duration,
    /// Time spent reducing the path (seconds).
    #[serde(with = "duration_serde")]
    pub reduce_duration: Duration,
    /// Number of data samples.
    pub sample_count: usize,
    /// Points in the laid-out path, before reduction.
    pub path_points: usize,
    /// Points after reduction.
    pub reduced_points: usize,
    /// Distinct pixel columns touched by the laid-out path.
    pub columns: usize,
    /// Reduction ratio: `1.0 - (reduced / path)`.
    pub reduction_ratio: f64,
}

/// High-level summary counts for the whole chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSummary {
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
    /// Reduction strategy used.
    pub reducer: String,
    /// Number of series.
    pub series_count: usize,
    /// Points across all laid-out paths.
    pub path_points: usize,
    /// Points across all reduced paths.
    pub reduced_points: usize,
}

/// Run [`process`](crate::process) while timing each series.
///
/// Produces the same [`ChartResult`] as `process` for the same inputs.
///
/// # Errors
///
/// Same as [`process`](crate::process).
pub fn process_with_diagnostics<C: Clock>(
    series: &[Series],
    config: &ChartConfig,
    clock: &C,
) -> Result<(ChartResult, ChartDiagnostics), ChartError> {
    let start = clock.now();
    let layout = crate::resolve_layout(series, config)?;

    let mut paths = Vec::with_capacity(series.len());
    let mut per_series = Vec::with_capacity(series.len());

    for s in series {
        let run = crate::chart_series(s, &layout, config.reducer, clock)?;

        per_series.push(SeriesDiagnostics {
            name: s.name.clone(),
            stepped: s.config.stepped,
            filled: s.config.filled,
            build_duration: run.build_duration,
            reduce_duration: run.reduce_duration,
            sample_count: s.points.len(),
            path_points: run.built.len(),
            reduced_points: run.path.polyline.len(),
            columns: spanned_columns(&run.built),
            reduction_ratio: reduction_ratio(run.built.len(), run.path.polyline.len()),
        });
        paths.push(run.path);
    }

    let result = ChartResult {
        paths,
        dimensions: config.dimensions,
    };
    let summary = ChartSummary {
        width: config.dimensions.width,
        height: config.dimensions.height,
        reducer: format!("{:?}", config.reducer),
        series_count: per_series.len(),
        path_points: per_series.iter().map(|d| d.path_points).sum(),
        reduced_points: per_series.iter().map(|d| d.reduced_points).sum(),
    };
    let diagnostics = ChartDiagnostics {
        series: per_series,
        total_duration: clock.elapsed(&start),
        summary,
    };

    Ok((result, diagnostics))
}

impl ChartDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Chart Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Chart: {}x{}  |  Reducer: {}",
            self.summary.width, self.summary.height, self.summary.reducer,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<20} {:>10} {:>10} {:>9} {:>9} {:>8}  {}",
            "Series", "Build", "Reduce", "Path", "Reduced", "Columns", "Flags"
        ));
        lines.push("-".repeat(80));

        for s in &self.series {
            let flags = match (s.stepped, s.filled) {
                (true, true) => "stepped,filled",
                (true, false) => "stepped",
                (false, true) => "filled",
                (false, false) => "-",
            };
            lines.push(format!(
                "{:<20} {:>8.3}ms {:>8.3}ms {:>9} {:>9} {:>8}  {flags}",
                s.name,
                duration_ms(s.build_duration),
                duration_ms(s.reduce_duration),
                s.path_points,
                s.reduced_points,
                s.columns,
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "Series: {}  |  Points: {} -> {} ({:.1}% reduction)",
            self.summary.series_count,
            self.summary.path_points,
            self.summary.reduced_points,
            reduction_ratio(self.summary.path_points, self.summary.reduced_points) * 100.0,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// `1.0 - after / before`, or 0.0 when there was nothing to reduce.
#[allow(clippy::cast_precision_loss)]
fn reduction_ratio(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        1.0 - after as f64 / before as f64
    }
}

/// Number of distinct pixel columns `[n, n + 1)` containing a point of
/// `polyline`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn spanned_columns(polyline: &Polyline) -> usize {
    let mut columns: Vec<i64> = polyline
        .points()
        .iter()
        .filter(|p| p.x.is_finite())
        .map(|p| p.x.floor() as i64)
        .collect();
    columns.sort_unstable();
    columns.dedup();
    columns.len()
}
