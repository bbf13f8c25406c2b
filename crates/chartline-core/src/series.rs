//! Chart path construction: lay out data series in pixel space.
//!
//! The reducer works in screen coordinates where one unit is one pixel,
//! so every series first goes through a [`ChartLayout`] that maps its data
//! ranges onto the chart surface. Stepped series gain corner points and
//! filled series are wrapped down to the baseline and back, producing the
//! closing segment the reducer recognises by its decreasing x.

use crate::types::{Axis, ChartError, DataRange, Dimensions, Point, Polyline, RenderConfig, Series};

/// Mapping from data space to the chart's pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    /// Data interval spanning the chart width.
    pub x_range: DataRange,
    /// Data interval spanning the chart height.
    pub y_range: DataRange,
    /// Chart surface size in pixels.
    pub dimensions: Dimensions,
}

impl ChartLayout {
    /// Create a layout, checking both ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidRange`] if either range is unusable and
    /// [`ChartError::InvalidConfig`] if either dimension is zero.
    pub fn new(
        x_range: DataRange,
        y_range: DataRange,
        dimensions: Dimensions,
    ) -> Result<Self, ChartError> {
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(ChartError::InvalidConfig(format!(
                "chart dimensions must be non-zero, got {}x{}",
                dimensions.width, dimensions.height,
            )));
        }
        Ok(Self {
            x_range: x_range.validate(Axis::X)?,
            y_range: y_range.validate(Axis::Y)?,
            dimensions,
        })
    }

    /// Screen y of the chart's bottom edge.
    #[must_use]
    pub fn baseline(&self) -> f64 {
        f64::from(self.dimensions.height)
    }

    /// Map a data point to screen space. `y_range.max` lands on the top
    /// edge (y = 0) and `y_range.min` on the bottom edge.
    #[must_use]
    pub fn to_screen(&self, point: Point) -> Point {
        let width = f64::from(self.dimensions.width);
        let height = f64::from(self.dimensions.height);
        Point::new(
            self.x_range.normalize(point.x) * width,
            (1.0 - self.y_range.normalize(point.y)) * height,
        )
    }
}

/// Union of the x and y extents of every sample in `series`.
///
/// An axis whose samples all share one value is widened on each side
/// (by 0.5, or more for very large values) so it still forms a valid range. Non-finite samples are skipped.
/// Returns `None` when there are no finite samples.
#[must_use]
pub fn data_bounds(series: &[Series]) -> Option<(DataRange, DataRange)> {
    let mut samples = series
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .filter(|p| p.is_finite());

    let first = samples.next()?;
    let (x, y) = samples.fold(
        (
            DataRange::new(first.x, first.x),
            DataRange::new(first.y, first.y),
        ),
        |(x, y), p| {
            (
                DataRange::new(x.min.min(p.x), x.max.max(p.x)),
                DataRange::new(y.min.min(p.y), y.max.max(p.y)),
            )
        },
    );

    Some((widen_degenerate(x), widen_degenerate(y)))
}

/// Widen a single-value extent to a usable range around it.
///
/// The margin is 0.5 or one unit in the last place of the value, whichever
/// is larger, so the ends stay distinct for magnitudes beyond 2^53.
fn widen_degenerate(range: DataRange) -> DataRange {
    if range.min < range.max {
        return range;
    }
    let margin = 0.5f64.max(range.min.abs() * f64::EPSILON);
    DataRange::new(
        (range.min - margin).max(f64::MIN),
        (range.max + margin).min(f64::MAX),
    )
}

/// Lay out one series as a screen-space polyline.
///
/// Samples must be finite and ordered by non-decreasing x. When the series
/// is stepped, a corner point `(x[i], y[i - 1])` is inserted before each
/// sample after the first. When it is filled, the path starts on the
/// baseline below the first sample, and after the last sample it drops to
/// the baseline and returns to its start.
///
/// An empty series produces an empty polyline.
///
/// # Errors
///
/// Returns [`ChartError::NonFinitePoint`] or [`ChartError::NonMonotonic`]
/// naming the first offending sample.
pub fn build_path(series: &Series, layout: &ChartLayout) -> Result<Polyline, ChartError> {
    validate_samples(series)?;

    let RenderConfig { stepped, filled } = series.config;
    let screen = series.points.iter().map(|&p| layout.to_screen(p));

    let extra = usize::from(filled) * 3;
    let capacity = if stepped {
        series.points.len() * 2
    } else {
        series.points.len()
    };
    let mut path = Polyline::with_capacity(capacity + extra);

    let mut previous: Option<Point> = None;
    for point in screen {
        match previous {
            None if filled => {
                path.push(Point::new(point.x, layout.baseline()));
            }
            Some(prev) if stepped => {
                path.push(Point::new(point.x, prev.y));
            }
            _ => {}
        }
        path.push(point);
        previous = Some(point);
    }

    if filled && let (Some(&start), Some(&end)) = (path.first(), path.last()) {
        path.push(Point::new(end.x, layout.baseline()));
        path.push(start);
    }

    Ok(path)
}

/// Check that samples are finite and x never decreases.
fn validate_samples(series: &Series) -> Result<(), ChartError> {
    let mut last_x = f64::NEG_INFINITY;
    for (index, point) in series.points.iter().enumerate() {
        if !point.is_finite() {
            return Err(ChartError::NonFinitePoint {
                series: series.name.clone(),
                index,
            });
        }
        if point.x < last_x {
            return Err(ChartError::NonMonotonic {
                series: series.name.clone(),
                index,
            });
        }
        last_x = point.x;
    }
    Ok(())
}
