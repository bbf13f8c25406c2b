//! Chart rasterisation via tiny-skia, and pixel comparison of two renders.

use chartline_core::{ChartResult, Polyline};
use chartline_export::svg::SERIES_COLORS;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

/// Alpha of the area under a filled series.
const FILL_ALPHA: u8 = 77;

/// Channel difference above which a pixel counts as visibly changed.
const SIGNIFICANT_DELTA: u8 = 64;

/// Render every series of a chart on a white background: 1px
/// anti-aliased strokes, plus a translucent fill for filled series.
///
/// Returns `None` if the chart has a zero dimension.
pub fn render_chart(chart: &ChartResult) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(chart.dimensions.width, chart.dimensions.height)?;
    pixmap.fill(Color::WHITE);

    let stroke = Stroke {
        width: 1.0,
        line_cap: LineCap::Butt,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    for (series, hex) in chart.paths.iter().zip(SERIES_COLORS.iter().cycle()) {
        let Some(path) = to_skia_path(&series.polyline, series.config.filled) else {
            // Fewer than 2 points: nothing visible.
            continue;
        };
        let (r, g, b) = parse_hex_color(hex).unwrap_or((0, 0, 0));

        let mut paint = Paint::default();
        paint.anti_alias = true;

        if series.config.filled {
            paint.set_color_rgba8(r, g, b, FILL_ALPHA);
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }

        paint.set_color_rgba8(r, g, b, 255);
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    Some(pixmap)
}

/// Build a tiny-skia path from a polyline, closing it when `close` is set.
#[allow(clippy::cast_possible_truncation)]
fn to_skia_path(polyline: &Polyline, close: bool) -> Option<Path> {
    let points = polyline.points();
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

/// Parse a `#rrggbb` colour.
fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Pixel-level difference between two renders of the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDiff {
    /// Pixels whose colour differs at all.
    pub differing: usize,
    /// Pixels where some channel differs by more than [`SIGNIFICANT_DELTA`].
    pub significant: usize,
    /// Pixels compared.
    pub total: usize,
}

impl PixelDiff {
    /// Fraction of compared pixels that differ significantly.
    #[allow(clippy::cast_precision_loss)]
    pub fn significant_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.significant as f64 / self.total as f64
        }
    }
}

/// Compare two pixmaps pixel by pixel.
///
/// Pixmaps of different sizes are compared over their common prefix of
/// pixels.
pub fn compare(a: &Pixmap, b: &Pixmap) -> PixelDiff {
    let mut diff = PixelDiff {
        differing: 0,
        significant: 0,
        total: 0,
    };
    for (pa, pb) in a.pixels().iter().zip(b.pixels()) {
        diff.total += 1;
        if pa == pb {
            continue;
        }
        diff.differing += 1;
        let delta = [
            pa.red().abs_diff(pb.red()),
            pa.green().abs_diff(pb.green()),
            pa.blue().abs_diff(pb.blue()),
            pa.alpha().abs_diff(pb.alpha()),
        ];
        if delta.iter().any(|&d| d > SIGNIFICANT_DELTA) {
            diff.significant += 1;
        }
    }
    diff
}
