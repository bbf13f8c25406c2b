//! SVG export serializer.
//!
//! Converts chart paths into an SVG string with `<path>` elements using
//! the [`svg`] crate for document construction, XML escaping, and path
//! data formatting.
//!
//! Each series becomes a separate `<path>` element using `M` (move to)
//! and `L` (line to) commands, stroked 1 unit wide so one path unit is
//! one pixel when the document is shown at its natural size. Filled
//! series are closed and get a translucent fill in the stroke colour.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use chartline_core::{ChartPath, ChartResult, Polyline};

/// Stroke colours assigned to series in order, wrapping around.
pub const SERIES_COLORS: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

/// Opacity of the area under a filled series.
const FILL_OPACITY: f64 = 0.3;

/// Metadata to embed in the SVG document.
///
/// All fields are optional.  Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized [`ChartConfig`](chartline_core::ChartConfig), emitted
    /// inside a `<metadata>` element wrapped in a namespaced
    /// `<chartline:chart>` element, so exported files carry the settings
    /// they were produced with.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a polyline.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for polylines with fewer than 2 points.
///
/// # Examples
///
/// ```
/// use chartline_core::{Point, Polyline};
/// use chartline_export::build_path_data;
///
/// let polyline = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
/// ]);
/// let d = build_path_data(&polyline);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(polyline: &Polyline) -> String {
    path_data(polyline).map_or_else(String::new, |data| String::from(Value::from(data)))
}

/// `M`/`L` commands for a polyline, or `None` if it has fewer than 2
/// points.
fn path_data(polyline: &Polyline) -> Option<Data> {
    let points = polyline.points();
    if points.len() < 2 {
        return None;
    }

    let first = &points[0];
    let mut data = Data::new().move_to((first.x, first.y));
    for p in &points[1..] {
        data = data.line_to((p.x, p.y));
    }
    Some(data)
}

/// Build the `<path>` element for one series, or `None` if it has
/// nothing visible to draw.
fn series_element(path: &ChartPath, color: &str) -> Option<Path> {
    let data = path_data(&path.polyline)?;

    let element = Path::new()
        .set("data-series", path.name.as_str())
        .set("stroke", color)
        .set("stroke-width", 1)
        .set("stroke-linejoin", "round");

    let element = if path.config.filled {
        element
            .set("d", data.close())
            .set("fill", color)
            .set("fill-opacity", FILL_OPACITY)
    } else {
        element.set("d", data).set("fill", "none")
    };
    Some(element)
}

/// Serialize a chart into an SVG document string.
///
/// The `viewBox` matches the chart's pixel dimensions. Each series with 2
/// or more points becomes a `<path>` element carrying a `data-series`
/// attribute with the series name; shorter ones are skipped. Colours are
/// taken from [`SERIES_COLORS`] in series order.
///
/// # Examples
///
/// ```
/// use chartline_core::{ChartPath, ChartResult, Dimensions, Point, Polyline, RenderConfig};
/// use chartline_export::{SvgMetadata, to_svg};
///
/// let chart = ChartResult {
///     paths: vec![ChartPath {
///         name: "cpu".to_string(),
///         config: RenderConfig::default(),
///         polyline: Polyline::new(vec![Point::new(0.0, 15.0), Point::new(12.5, 18.5)]),
///     }],
///     dimensions: Dimensions { width: 800, height: 200 },
/// };
/// let metadata = SvgMetadata {
///     title: Some("load"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&chart, &metadata);
/// assert!(svg.contains("<title>load</title>"));
/// assert!(svg.contains("M0,15 L12.5,18.5"));
/// ```
#[must_use]
pub fn to_svg(chart: &ChartResult, metadata: &SvgMetadata<'_>) -> String {
    let w = chart.dimensions.width;
    let h = chart.dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", format!("0 0 {w} {h}"));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut chart_el = Element::new("chartline:chart");
        chart_el.assign("xmlns:chartline", "https://chartline.dev/ns/1");
        chart_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(chart_el);
        doc = doc.add(metadata_el);
    }

    for (path, color) in chart.paths.iter().zip(SERIES_COLORS.iter().cycle()) {
        if let Some(element) = series_element(path, color) {
            doc = doc.add(element);
        }
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
