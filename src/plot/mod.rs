//! Layered trend chart: regime bands, series lines and text labels.
//!
//! [`TrendChart::builder`] collects layer descriptors in any order; `build`
//! fixes the drawing order to bands, then lines, then labels. Rendering
//! produces an SVG string and only touches the filesystem through
//! [`TrendChart::save`].

mod chart;
mod labels;
mod render;
mod style;

pub use chart::{Label, Layer, PlacedLabel, TrendChart, TrendChartBuilder};
pub use labels::spread_labels;
pub use style::{Dash, LineStyle, PALETTE, band_color};

/// Fixed y-axis domain.
pub const Y_MIN: f64 = -10.0;
pub const Y_MAX: f64 = 10.0;
