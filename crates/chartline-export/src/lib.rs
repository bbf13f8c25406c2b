//! chartline-export: Pure format serializers (sans-IO)
//!
//! Converts reduced chart paths into output formats. Currently supports SVG.

pub mod svg;

pub use svg::{SvgMetadata, build_path_data, to_svg};
