use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::debug;

use super::chart::{Layer, TrendChart};
use super::style::{Dash, band_color};
use super::{Y_MAX, Y_MIN};
use crate::error::{PipelineError, Result};

const BAND_ALPHA: f64 = 0.25;

fn render_err(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Render(e.to_string())
}

pub(super) fn render_svg(chart: &TrendChart) -> Result<String> {
    let (x_min, x_max) = chart.x_range();
    let labels = chart.placed_labels();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, chart.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(chart.title.as_str(), ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(48)
            .build_cartesian_2d(x_min..x_max, Y_MIN..Y_MAX)
            .map_err(render_err)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_label_formatter(&|x| format!("{x:.0}"))
            .y_label_formatter(&|y| format!("{y:.0}"))
            .draw()
            .map_err(render_err)?;

        for layer in chart.layers() {
            match layer {
                Layer::Band(band) => {
                    let fill = band_color(band.label).mix(BAND_ALPHA).filled();
                    let (lo, hi) = band.render_bounds(Y_MIN, Y_MAX);
                    ctx.draw_series(std::iter::once(Rectangle::new(
                        [(x_min, lo), (x_max, hi)],
                        fill,
                    )))
                    .map_err(render_err)?
                    .label(band.label.to_string())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 16, y + 6)], fill));
                }
                Layer::Line { series, style } => {
                    let stroke = style.color.stroke_width(style.width);
                    let points = series.points.iter().map(|&(year, v)| (year as f64, v));
                    let anno = match style.dash {
                        Dash::Solid => ctx.draw_series(LineSeries::new(points, stroke)),
                        Dash::Dashed => {
                            ctx.draw_series(DashedLineSeries::new(points, 8u32, 5u32, stroke))
                        }
                    }
                    .map_err(render_err)?;
                    anno.label(series.name.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke));
                }
                // drawn below from the resolved positions
                Layer::Label(_) => {}
            }
        }

        for label in &labels {
            let font = ("sans-serif", 14).into_font().color(&label.color);
            ctx.draw_series(std::iter::once(Text::new(
                label.text.clone(),
                (label.x, label.y),
                font,
            )))
            .map_err(render_err)?;
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::LowerLeft)
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    debug!(bytes = svg.len(), layers = chart.layers().len(), "Chart rendered");
    Ok(svg)
}
