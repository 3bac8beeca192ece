use plotters::style::RGBColor;

use crate::analysis::Regime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: RGBColor,
    pub dash: Dash,
    pub width: u32,
}

impl LineStyle {
    pub fn solid(color: RGBColor, width: u32) -> Self {
        Self {
            color,
            dash: Dash::Solid,
            width,
        }
    }

    pub fn dashed(color: RGBColor, width: u32) -> Self {
        Self {
            color,
            dash: Dash::Dashed,
            width,
        }
    }
}

/// Colors for additional named series, cycled in order.
pub const PALETTE: &[RGBColor] = &[
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
];

pub fn band_color(regime: Regime) -> RGBColor {
    match regime {
        Regime::Anocracy => RGBColor(240, 200, 90),
        Regime::Autocracy => RGBColor(215, 95, 85),
        Regime::Democracy => RGBColor(95, 150, 215),
    }
}
