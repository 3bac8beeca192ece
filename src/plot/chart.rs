use std::path::Path;

use plotters::style::{BLACK, RGBColor};
use tracing::{info, warn};

use super::labels::spread_labels;
use super::style::LineStyle;
use super::{Y_MAX, Y_MIN, render};
use crate::analysis::{ClassificationBand, NamedSeries};
use crate::error::Result;

const LABEL_GAP: f64 = 0.9;
const DEFAULT_SIZE: (u32, u32) = (900, 560);
const DEFAULT_YEARS: (i32, i32) = (2000, 2020);

/// Text placed on the chart.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    /// Caller-chosen anchor in data coordinates.
    Fixed { text: String, x: f64, y: f64 },
    /// The named series' point at `year`, spread away from other auto labels.
    AtYear { series: String, year: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Band(ClassificationBand),
    Line { series: NamedSeries, style: LineStyle },
    Label(Label),
}

impl Layer {
    fn z_order(&self) -> u8 {
        match self {
            Layer::Band(_) => 0,
            Layer::Line { .. } => 1,
            Layer::Label(_) => 2,
        }
    }
}

/// A label resolved to a position and color.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: RGBColor,
}

#[derive(Debug, Clone)]
pub struct TrendChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub size: (u32, u32),
    layers: Vec<Layer>,
}

#[derive(Debug, Clone)]
pub struct TrendChartBuilder {
    title: String,
    x_desc: String,
    y_desc: String,
    size: (u32, u32),
    layers: Vec<Layer>,
}

impl Default for TrendChartBuilder {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_desc: "Year".to_string(),
            y_desc: "Polity score".to_string(),
            size: DEFAULT_SIZE,
            layers: Vec::new(),
        }
    }
}

impl TrendChartBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_desc = x.into();
        self.y_desc = y.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn bands(mut self, bands: &[ClassificationBand]) -> Self {
        self.layers.extend(bands.iter().copied().map(Layer::Band));
        self
    }

    pub fn line(mut self, series: NamedSeries, style: LineStyle) -> Self {
        self.layers.push(Layer::Line { series, style });
        self
    }

    pub fn fixed_label(mut self, text: impl Into<String>, x: f64, y: f64) -> Self {
        self.layers.push(Layer::Label(Label::Fixed {
            text: text.into(),
            x,
            y,
        }));
        self
    }

    pub fn label_at_year(mut self, series: impl Into<String>, year: i32) -> Self {
        self.layers.push(Layer::Label(Label::AtYear {
            series: series.into(),
            year,
        }));
        self
    }

    /// Orders layers bands → lines → labels, keeping call order within each kind.
    pub fn build(mut self) -> TrendChart {
        self.layers.sort_by_key(Layer::z_order);
        TrendChart {
            title: self.title,
            x_desc: self.x_desc,
            y_desc: self.y_desc,
            size: self.size,
            layers: self.layers,
        }
    }
}

impl TrendChart {
    pub fn builder() -> TrendChartBuilder {
        TrendChartBuilder::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn lines(&self) -> impl Iterator<Item = (&NamedSeries, &LineStyle)> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Line { series, style } => Some((series, style)),
            _ => None,
        })
    }

    /// Year range covered by the lines, padded by half a year on each side.
    pub fn x_range(&self) -> (f64, f64) {
        let years = self
            .lines()
            .flat_map(|(series, _)| series.points.iter().map(|(year, _)| *year));
        let (min, max) = years.fold(None, |acc: Option<(i32, i32)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
        .unwrap_or(DEFAULT_YEARS);
        (min as f64 - 0.5, max as f64 + 0.5)
    }

    /// Resolves every label layer to a position; auto labels are spread apart.
    pub fn placed_labels(&self) -> Vec<PlacedLabel> {
        let mut fixed = Vec::new();
        let mut auto = Vec::new();

        for layer in &self.layers {
            let Layer::Label(label) = layer else { continue };
            match label {
                Label::Fixed { text, x, y } => fixed.push(PlacedLabel {
                    text: text.clone(),
                    x: *x,
                    y: *y,
                    color: BLACK,
                }),
                Label::AtYear { series, year } => {
                    let found = self
                        .lines()
                        .find(|(s, _)| &s.name == series)
                        .and_then(|(s, style)| s.value_at(*year).map(|v| (v, style.color)));
                    match found {
                        Some((value, color)) => auto.push(PlacedLabel {
                            text: series.clone(),
                            x: *year as f64,
                            y: value,
                            color,
                        }),
                        None => warn!(series = %series, year, "No data point to anchor label"),
                    }
                }
            }
        }

        let anchors: Vec<f64> = auto.iter().map(|l| l.y).collect();
        let spread = spread_labels(&anchors, LABEL_GAP, Y_MIN, Y_MAX);
        for (label, y) in auto.iter_mut().zip(spread) {
            label.y = y;
        }

        fixed.extend(auto);
        fixed
    }

    /// Renders the chart to an SVG document held in memory.
    pub fn render_svg(&self) -> Result<String> {
        render::render_svg(self)
    }

    /// Renders and writes the SVG to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let svg = self.render_svg()?;
        std::fs::write(path, svg)?;
        info!(path = %path.display(), "Chart written");
        Ok(())
    }
}
