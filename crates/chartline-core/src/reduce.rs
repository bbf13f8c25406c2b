//! Path reduction: shrink dense line-chart paths to at most two points per
//! pixel column.
//!
//! A series with many samples per horizontal pixel renders as a vertical
//! smear within each column. Stroked with a 1px line, only the lowest and
//! highest point of each column are visible, plus the segments joining
//! neighbouring columns. [`reduce`] keeps exactly those, so rendering cost
//! scales with the chart width instead of the sample count.
//!
//! This module defines the [`PathReducer`] trait and the [`ReducerKind`]
//! enum for selecting a strategy at runtime.

use serde::{Deserialize, Serialize};

use crate::path::PathSource;
use crate::types::{Point, Polyline, RenderConfig};

/// Selects which reduction strategy to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReducerKind {
    /// Per-pixel-column min/max reduction (see [`reduce`]).
    #[default]
    MinMax,

    /// Return every input point. Useful as a baseline when comparing
    /// rendered output.
    Passthrough,
}

/// Trait for path reduction strategies.
///
/// Input: a screen-space path whose x-coordinates are non-decreasing,
/// except for an optional closing segment at the end of a filled area.
/// Output: a path that renders the same at 1px line width.
pub trait PathReducer {
    /// Reduce `path` drawn with `config`.
    fn reduce<P: PathSource + ?Sized>(&self, path: &P, config: &RenderConfig) -> Polyline;
}

impl PathReducer for ReducerKind {
    fn reduce<P: PathSource + ?Sized>(&self, path: &P, config: &RenderConfig) -> Polyline {
        match *self {
            Self::MinMax => reduce(path, config),
            Self::Passthrough => Polyline::from_source(path),
        }
    }
}

/// Reduce a path to at most two points per pixel column.
///
/// The first and last points are always kept. In between, samples are
/// grouped into columns `[n, n + 1)` by their x-coordinate, and each column
/// contributes its lowest-y and highest-y sample, ordered left to right.
/// Among samples tied for highest y the right-most one wins.
///
/// Scanning stops at the first sample whose x is smaller than its
/// predecessor's: that is where a filled-area path turns back toward its
/// start along the baseline. The sample that turned back is appended as
/// the final point.
///
/// A point equal (within [`Point::EPSILON`]) to the previously emitted one
/// is never emitted twice.
///
/// Stepped paths and empty paths are returned unchanged.
///
/// # Examples
///
/// ```
/// use chartline_core::reduce::reduce;
/// use chartline_core::{Point, Polyline, RenderConfig};
///
/// // 100 samples, all inside the pixel column [3, 4).
/// let dense: Polyline = (0..100)
///     .map(|i| Point::new(3.0 + f64::from(i) / 100.0, f64::from(i % 7)))
///     .collect();
/// let reduced = reduce(&dense, &RenderConfig::default());
/// assert!(reduced.len() <= 4);
/// ```
#[must_use = "returns the reduced polyline"]
pub fn reduce<P: PathSource + ?Sized>(path: &P, config: &RenderConfig) -> Polyline {
    if config.stepped {
        // Stepped lines have horizontal runs whose end points matter;
        // min/max per column would cut the corners.
        return Polyline::from_source(path);
    }

    let mut points = path.vertices();
    let Some(first) = points.next() else {
        return Polyline::default();
    };

    let mut out = Polyline::with_capacity(points.size_hint().0.min(1024) + 1);
    push_distinct(&mut out, first);

    let mut current = first;
    let mut bucket: Option<PixelBucket> = None;

    for point in points {
        let last_x = current.x;
        current = point;

        if point.x < last_x {
            log::trace!("closing segment at ({}, {})", point.x, point.y);
            break;
        }

        match &mut bucket {
            Some(column) if point.x < column.boundary => column.include(point),
            open => {
                if let Some(done) = open.replace(PixelBucket::open(point)) {
                    done.flush(&mut out);
                }
            }
        }
    }

    if let Some(done) = bucket {
        done.flush(&mut out);
    }

    // A filled path drops to the baseline at both ends. The drop at the
    // start falls out of the first column's min/max; the one at the end
    // has to be put back explicitly.
    push_distinct(&mut out, current);

    out
}

/// Extremes of the pixel column currently being scanned.
#[derive(Debug, Clone, Copy)]
struct PixelBucket {
    /// First x-coordinate past this column.
    boundary: f64,
    /// Sample with the smallest y (earliest among ties).
    min: Point,
    /// Sample with the largest y (latest among ties).
    max: Point,
}

impl PixelBucket {
    /// Start a column at `seed`.
    fn open(seed: Point) -> Self {
        Self {
            boundary: seed.x.floor() + 1.0,
            min: seed,
            max: seed,
        }
    }

    /// Fold another sample from the same column into the extremes.
    fn include(&mut self, point: Point) {
        if point.y < self.min.y {
            self.min = point;
        }
        if point.y >= self.max.y {
            self.max = point;
        }
    }

    /// Emit the extremes in ascending x order.
    fn flush(self, out: &mut Polyline) {
        if self.max.x < self.min.x {
            push_distinct(out, self.max);
            push_distinct(out, self.min);
        } else {
            push_distinct(out, self.min);
            push_distinct(out, self.max);
        }
    }
}

/// Append `point` unless it duplicates the current last point.
fn push_distinct(out: &mut Polyline, point: Point) {
    if out.last().is_some_and(|last| last.approx_eq(point)) {
        return;
    }
    out.push(point);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;

    const LINE: RenderConfig = RenderConfig {
        stepped: false,
        filled: false,
    };

    /// Helper: build a polyline from (x, y) pairs.
    fn poly(coords: &[(f64, f64)]) -> Polyline {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    /// Dense wave with 20 samples per pixel column over `columns` columns.
    fn dense_wave(columns: u32) -> Polyline {
        (0..columns * 20)
            .map(|i| {
                let x = f64::from(i) * 0.05;
                let y = 40.0f64.mul_add((f64::from(i) * 0.7).sin(), 50.0);
                Point::new(x, y)
            })
            .collect()
    }

    fn assert_no_consecutive_duplicates(pl: &Polyline) {
        for w in pl.points().windows(2) {
            assert!(
                !w[0].approx_eq(w[1]),
                "consecutive duplicate points {:?} and {:?}",
                w[0],
                w[1],
            );
        }
    }

    // --- Pass-through cases ---

    #[test]
    fn empty_path_returns_empty() {
        let result = reduce(&Polyline::default(), &LINE);
        assert!(result.is_empty());
    }

    #[test]
    fn stepped_path_returned_unchanged() {
        let pl = dense_wave(5);
        let stepped = RenderConfig {
            stepped: true,
            filled: false,
        };
        assert_eq!(reduce(&pl, &stepped), pl);
    }

    #[test]
    fn single_point_returns_single_point() {
        let result = reduce(&poly(&[(3.0, 4.0)]), &LINE);
        assert_eq!(result, poly(&[(3.0, 4.0)]));
    }

    #[test]
    fn repeated_point_collapses() {
        let result = reduce(&poly(&[(1.0, 1.0), (1.0, 1.0)]), &LINE);
        assert_eq!(result, poly(&[(1.0, 1.0)]));
    }

    // --- Reference traces ---

    #[test]
    fn single_column_keeps_first_min_max_and_last() {
        // (0.1, 5) is emitted as the move-to. (0.2, 1) seeds the column
        // bucket and stays its minimum; (0.3, 9) becomes its maximum;
        // (0.4, 3) is neither but is appended as the final point.
        let pl = poly(&[(0.1, 5.0), (0.2, 1.0), (0.3, 9.0), (0.4, 3.0)]);
        let result = reduce(&pl, &LINE);
        assert_eq!(
            result,
            poly(&[(0.1, 5.0), (0.2, 1.0), (0.3, 9.0), (0.4, 3.0)])
        );
    }

    #[test]
    fn single_column_drops_interior_samples() {
        let pl = poly(&[
            (0.1, 5.0),
            (0.2, 4.0),
            (0.3, 1.0),
            (0.4, 6.0),
            (0.5, 9.0),
            (0.6, 3.0),
            (0.7, 4.0),
        ]);
        let result = reduce(&pl, &LINE);
        assert_eq!(
            result,
            poly(&[(0.1, 5.0), (0.3, 1.0), (0.5, 9.0), (0.7, 4.0)])
        );
    }

    #[test]
    fn one_sample_per_column_is_kept_as_is() {
        let pl = poly(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]);
        let result = reduce(&pl, &LINE);
        assert_eq!(result, pl);
    }

    #[test]
    fn max_tie_prefers_later_sample() {
        // (0.2, 5) seeds the bucket; (0.4, 5) ties on y and replaces it as
        // max; (0.6, 1) becomes min. The max precedes the min in x, so it
        // is emitted first.
        let pl = poly(&[(0.0, 0.0), (0.2, 5.0), (0.4, 5.0), (0.6, 1.0)]);
        let result = reduce(&pl, &LINE);
        assert_eq!(result, poly(&[(0.0, 0.0), (0.4, 5.0), (0.6, 1.0)]));
    }

    #[test]
    fn min_tie_keeps_earlier_sample() {
        let pl = poly(&[(0.0, 9.0), (0.2, 1.0), (0.4, 1.0), (0.6, 7.0)]);
        let result = reduce(&pl, &LINE);
        assert_eq!(result, poly(&[(0.0, 9.0), (0.2, 1.0), (0.6, 7.0)]));
    }

    #[test]
    fn extremes_emitted_in_ascending_x() {
        let pl = poly(&[(0.0, 0.0), (0.1, 9.0), (0.5, 2.0), (1.5, 4.0)]);
        let result = reduce(&pl, &LINE);
        assert_eq!(
            result,
            poly(&[(0.0, 0.0), (0.1, 9.0), (0.5, 2.0), (1.5, 4.0)])
        );
    }

    #[test]
    fn closing_segment_stops_scan_and_is_appended() {
        let pl = poly(&[(0.0, 0.0), (1.0, 5.0), (2.0, 8.0), (0.5, 0.0)]);
        let result = reduce(&pl, &LINE);
        assert_eq!(
            result,
            poly(&[(0.0, 0.0), (1.0, 5.0), (2.0, 8.0), (0.5, 0.0)])
        );
    }

    #[test]
    fn points_after_closing_segment_are_dropped() {
        let pl = poly(&[
            (0.0, 10.0),
            (0.0, 4.0),
            (1.2, 6.0),
            (2.5, 3.0),
            (2.5, 10.0),
            (0.0, 10.0),
            (7.0, 7.0),
        ]);
        let result = reduce(&pl, &LINE);
        assert_eq!(
            result,
            poly(&[
                (0.0, 10.0),
                (0.0, 4.0),
                (1.2, 6.0),
                (2.5, 3.0),
                (2.5, 10.0),
                (0.0, 10.0),
            ])
        );
    }

    #[test]
    fn near_duplicate_points_are_suppressed() {
        let pl = poly(&[(0.0, 0.0), (0.5, 3.0), (0.500_000_1, 3.000_000_1)]);
        let result = reduce(&pl, &LINE);
        assert_eq!(result, poly(&[(0.0, 0.0), (0.5, 3.0)]));
    }

    // --- Properties ---

    #[test]
    fn dense_wave_is_bounded_by_column_count() {
        let pl = dense_wave(100);
        let result = reduce(&pl, &LINE);
        assert_eq!(result.first(), pl.first());
        assert_eq!(result.last(), pl.last());
        assert!(
            result.len() <= 2 * 100 + 2,
            "expected at most 202 points, got {}",
            result.len(),
        );
        assert!(result.len() < pl.len());
    }

    #[test]
    fn dense_wave_has_no_consecutive_duplicates() {
        assert_no_consecutive_duplicates(&reduce(&dense_wave(50), &LINE));
    }

    #[test]
    fn column_extremes_are_preserved() {
        let pl = dense_wave(10);
        let result = reduce(&pl, &LINE);
        for column in 0..10 {
            let lo = f64::from(column);
            let hi = lo + 1.0;
            let in_column = |p: &&Point| p.x >= lo && p.x < hi;
            let source_min = pl
                .points()
                .iter()
                .filter(in_column)
                .map(|p| p.y)
                .fold(f64::INFINITY, f64::min);
            let source_max = pl
                .points()
                .iter()
                .filter(in_column)
                .map(|p| p.y)
                .fold(f64::NEG_INFINITY, f64::max);
            let kept: Vec<f64> = result.points().iter().filter(in_column).map(|p| p.y).collect();
            assert!(kept.contains(&source_min), "column {column} lost its min");
            assert!(kept.contains(&source_max), "column {column} lost its max");
        }
    }

    #[test]
    fn output_x_is_non_decreasing() {
        let result = reduce(&dense_wave(30), &LINE);
        for w in result.points().windows(2) {
            assert!(w[1].x >= w[0].x, "{:?} precedes {:?}", w[0], w[1]);
        }
    }

    #[test]
    fn reduction_is_idempotent() {
        let once = reduce(&dense_wave(40), &LINE);
        let twice = reduce(&once, &LINE);
        assert_eq!(twice, once);
    }

    #[test]
    fn fill_path_reduction_is_idempotent() {
        let pl = poly(&[
            (0.0, 10.0),
            (0.0, 4.0),
            (0.5, 2.0),
            (1.2, 6.0),
            (2.5, 3.0),
            (2.5, 10.0),
            (0.0, 10.0),
        ]);
        let once = reduce(&pl, &LINE);
        assert_eq!(once, pl);
        assert_eq!(reduce(&once, &LINE), once);
    }

    #[test]
    fn dense_fill_path_reduction_is_idempotent() {
        let wave = dense_wave(25);
        let start = Point::new(0.0, 100.0);
        let end = wave.last().map(|p| Point::new(p.x, 100.0)).unwrap_or(start);
        let filled: Polyline = std::iter::once(start)
            .chain(wave.points().iter().copied())
            .chain([end, start])
            .collect();

        let once = reduce(&filled, &LINE);
        assert!(once.len() < filled.len());
        assert_eq!(once.last(), Some(&start));
        assert_eq!(reduce(&once, &LINE), once);
    }

    #[test]
    fn reads_segment_sources() {
        let segs = vec![
            PathSegment::MoveTo(Point::new(0.1, 5.0)),
            PathSegment::LineTo(Point::new(0.2, 1.0)),
            PathSegment::LineTo(Point::new(0.3, 9.0)),
            PathSegment::LineTo(Point::new(0.35, 4.0)),
            PathSegment::LineTo(Point::new(0.4, 3.0)),
        ];
        let result = reduce(&segs, &LINE);
        assert_eq!(
            result,
            poly(&[(0.1, 5.0), (0.2, 1.0), (0.3, 9.0), (0.4, 3.0)])
        );
    }

    // --- Strategy selection ---

    #[test]
    fn default_is_min_max() {
        assert_eq!(ReducerKind::default(), ReducerKind::MinMax);
    }

    #[test]
    fn min_max_kind_matches_reduce() {
        let pl = dense_wave(8);
        assert_eq!(ReducerKind::MinMax.reduce(&pl, &LINE), reduce(&pl, &LINE));
    }

    #[test]
    fn passthrough_keeps_every_point() {
        let pl = dense_wave(8);
        assert_eq!(ReducerKind::Passthrough.reduce(&pl, &LINE), pl);
    }
}
