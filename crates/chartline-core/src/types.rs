//! Shared types for chart path construction and reduction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reduce::ReducerKind;

/// A 2D point. In data space the axes are whatever the series measures;
/// in screen space `x` grows to the right and `y` grows downward, one unit
/// per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Tolerance used by [`approx_eq`](Self::approx_eq) on each axis.
    pub const EPSILON: f64 = 1e-6;

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates are within [`Self::EPSILON`]
    /// of `other`'s.
    ///
    /// Used when emitting points so that floating-point noise does not
    /// produce zero-length segments.
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() <= Self::EPSILON && (self.y - other.y).abs() <= Self::EPSILON
    }

    /// Returns `true` if neither coordinate is NaN or infinite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A sequence of connected points: a move-to the first point followed by
/// a line-to each subsequent point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Create an empty polyline with room for `capacity` points.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Append a point. The first point pushed becomes the move-to.
    pub fn push(&mut self, point: Point) {
        self.0.push(point);
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Line rendering flags for a single series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Draw the series as a staircase (horizontal then vertical moves)
    /// instead of straight segments between samples.
    ///
    /// Stepped paths are never reduced.
    #[serde(default)]
    pub stepped: bool,

    /// Fill the area between the line and the bottom of the chart.
    #[serde(default)]
    pub filled: bool,
}

/// Chart surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Chart axis, used to label range errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// A closed interval of data values mapped onto one chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    /// Value mapped to the left (x) or bottom (y) edge.
    pub min: f64,
    /// Value mapped to the right (x) or top (y) edge.
    pub max: f64,
}

impl DataRange {
    /// Create a new range. No validation is performed; see
    /// [`is_valid`](Self::is_valid).
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range is usable when both ends are finite, `min < max`, and the
    /// span itself does not overflow.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min < self.max
            && self.span().is_finite()
    }

    /// Length of the interval.
    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    /// Map `value` to its fraction of the interval (`min` -> 0.0, `max` -> 1.0).
    /// Values outside the interval map outside `[0, 1]`.
    #[must_use]
    pub fn normalize(self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }

    /// Check validity, reporting the offending `axis` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidRange`] if the range is not valid.
    pub fn validate(self, axis: Axis) -> Result<Self, ChartError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ChartError::InvalidRange {
                axis,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// One named data series and the way it should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Display name, carried through to the output paths.
    pub name: String,
    /// Samples in data space, x non-decreasing.
    pub points: Vec<Point>,
    /// Rendering flags.
    #[serde(default)]
    pub config: RenderConfig,
}

impl Series {
    /// Create a series with default rendering flags.
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
            config: RenderConfig::default(),
        }
    }

    /// Replace the rendering flags.
    #[must_use]
    pub const fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }
}

/// Configuration for turning series into reduced chart paths.
///
/// # Invariants
///
/// Both dimensions must be non-zero and explicit ranges must satisfy
/// [`DataRange::is_valid`]. [`validate`](Self::validate) checks both and
/// [`process`](crate::process) calls it before doing any work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Chart surface size in pixels.
    pub dimensions: Dimensions,

    /// Data interval spanning the chart width. `None` derives it from
    /// the data.
    pub x_range: Option<DataRange>,

    /// Data interval spanning the chart height. `None` derives it from
    /// the data.
    pub y_range: Option<DataRange>,

    /// Which reduction strategy to apply to each series path.
    pub reducer: ReducerKind,
}

impl ChartConfig {
    /// Default chart width in pixels.
    pub const DEFAULT_WIDTH: u32 = 800;
    /// Default chart height in pixels.
    pub const DEFAULT_HEIGHT: u32 = 200;
    /// Default reduction strategy.
    pub const DEFAULT_REDUCER: ReducerKind = ReducerKind::MinMax;

    /// Check the invariants listed on the type.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidConfig`] for a zero dimension and
    /// [`ChartError::InvalidRange`] for an unusable explicit range.
    pub fn validate(&self) -> Result<(), ChartError> {
        if self.dimensions.width == 0 || self.dimensions.height == 0 {
            return Err(ChartError::InvalidConfig(format!(
                "chart dimensions must be non-zero, got {}x{}",
                self.dimensions.width, self.dimensions.height,
            )));
        }
        if let Some(range) = self.x_range {
            range.validate(Axis::X)?;
        }
        if let Some(range) = self.y_range {
            range.validate(Axis::Y)?;
        }
        Ok(())
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions {
                width: Self::DEFAULT_WIDTH,
                height: Self::DEFAULT_HEIGHT,
            },
            x_range: None,
            y_range: None,
            reducer: Self::DEFAULT_REDUCER,
        }
    }
}

/// A series after layout and reduction, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPath {
    /// Name of the source series.
    pub name: String,
    /// Rendering flags of the source series.
    pub config: RenderConfig,
    /// Screen-space path.
    pub polyline: Polyline,
}

/// Output of [`process`](crate::process).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    /// One path per input series, in input order.
    pub paths: Vec<ChartPath>,
    /// Chart surface size the paths were laid out for.
    pub dimensions: Dimensions,
}

impl ChartResult {
    /// Total number of points across all paths.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.paths.iter().map(|p| p.polyline.len()).sum()
    }
}

/// Errors that can occur while laying out chart paths.
///
/// Reduction itself never fails; these come from validating configuration
/// and input data.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum ChartError {
    /// Chart configuration is invalid.
    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),

    /// A data range is empty, inverted, or not finite.
    #[error("invalid {axis} range [{min}, {max}]")]
    InvalidRange {
        /// Axis the range belongs to.
        axis: Axis,
        /// Lower end of the range.
        min: f64,
        /// Upper end of the range.
        max: f64,
    },

    /// A sample has a NaN or infinite coordinate.
    #[error("series {series:?}: point {index} is not finite")]
    NonFinitePoint {
        /// Name of the offending series.
        series: String,
        /// Index of the offending sample.
        index: usize,
    },

    /// A sample's x is smaller than the previous sample's.
    #[error("series {series:?}: point {index} has decreasing x")]
    NonMonotonic {
        /// Name of the offending series.
        series: String,
        /// Index of the offending sample.
        index: usize,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_within_epsilon() {
        let a = Point::new(1.0, 2.0);
        assert!(a.approx_eq(Point::new(1.0 + 5e-7, 2.0 - 5e-7)));
        assert!(a.approx_eq(Point::new(1.0 + Point::EPSILON, 2.0)));
    }

    #[test]
    fn approx_eq_requires_both_axes() {
        let a = Point::new(1.0, 2.0);
        assert!(!a.approx_eq(Point::new(1.0, 2.001)));
        assert!(!a.approx_eq(Point::new(1.001, 2.0)));
    }

    #[test]
    fn data_range_normalize() {
        let r = DataRange::new(10.0, 20.0);
        assert!((r.normalize(10.0) - 0.0).abs() < f64::EPSILON);
        assert!((r.normalize(15.0) - 0.5).abs() < f64::EPSILON);
        assert!((r.normalize(20.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn data_range_validity() {
        assert!(DataRange::new(0.0, 1.0).is_valid());
        assert!(!DataRange::new(1.0, 1.0).is_valid());
        assert!(!DataRange::new(2.0, 1.0).is_valid());
        assert!(!DataRange::new(f64::NAN, 1.0).is_valid());
        assert!(!DataRange::new(0.0, f64::INFINITY).is_valid());
        assert!(!DataRange::new(-1e308, 1e308).is_valid());
        assert!(DataRange::new(-1e307, 1e307).is_valid());
    }

    #[test]
    fn data_range_validate_reports_axis() {
        let err = DataRange::new(3.0, 3.0).validate(Axis::Y).unwrap_err();
        assert_eq!(
            err,
            ChartError::InvalidRange {
                axis: Axis::Y,
                min: 3.0,
                max: 3.0
            }
        );
        assert_eq!(err.to_string(), "invalid y range [3, 3]");
    }

    #[test]
    fn default_config_is_valid() {
        assert!(ChartConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_width_is_invalid() {
        let config = ChartConfig {
            dimensions: Dimensions {
                width: 0,
                height: 10,
            },
            ..ChartConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChartError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_x_range_is_invalid() {
        let config = ChartConfig {
            x_range: Some(DataRange::new(5.0, 1.0)),
            ..ChartConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChartError::InvalidRange { axis: Axis::X, .. })
        ));
    }

    #[test]
    fn config_json_round_trip() {
        let config = ChartConfig {
            x_range: Some(DataRange::new(0.0, 60.0)),
            reducer: ReducerKind::Passthrough,
            ..ChartConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ChartConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn config_json_fills_missing_fields() {
        let config: ChartConfig =
            serde_json::from_str(r#"{"dimensions":{"width":320,"height":40}}"#).unwrap();
        assert_eq!(config.dimensions.width, 320);
        assert_eq!(config.reducer, ChartConfig::DEFAULT_REDUCER);
        assert!(config.x_range.is_none());
    }

    #[test]
    fn series_json_defaults_render_config() {
        let series: Series =
            serde_json::from_str(r#"{"name":"cpu","points":[{"x":0.0,"y":1.0}]}"#).unwrap();
        assert_eq!(series.config, RenderConfig::default());
        assert_eq!(series.points, vec![Point::new(0.0, 1.0)]);
    }
}
