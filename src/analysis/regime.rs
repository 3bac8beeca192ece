use serde::Serialize;
use std::fmt;

/// Regime label attached to a score range.
///
/// Variants are declared alphabetically; that order drives band z-order and
/// legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Regime {
    Anocracy,
    Autocracy,
    Democracy,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Regime::Anocracy => "Anocracy",
            Regime::Autocracy => "Autocracy",
            Regime::Democracy => "Democracy",
        };
        f.write_str(name)
    }
}

/// A closed score range `[range_start, range_end]` shaded with one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationBand {
    pub range_start: i32,
    pub range_end: i32,
    pub label: Regime,
}

impl ClassificationBand {
    pub fn contains(&self, score: i32) -> bool {
        (self.range_start..=self.range_end).contains(&score)
    }

    /// Band edges widened by half a unit and clamped to `[lo, hi]`, so
    /// adjacent integer ranges meet without a visible gap.
    pub fn render_bounds(&self, lo: f64, hi: f64) -> (f64, f64) {
        (
            (self.range_start as f64 - 0.5).max(lo),
            (self.range_end as f64 + 0.5).min(hi),
        )
    }
}

/// Score ranges used for background shading.
///
/// | Range      | Label     |
/// |------------|-----------|
/// | -5 ..= 5   | Anocracy  |
/// | -10 ..= -6 | Autocracy |
/// | 6 ..= 10   | Democracy |
pub static BANDS: &[ClassificationBand] = &[
    ClassificationBand {
        range_start: -5,
        range_end: 5,
        label: Regime::Anocracy,
    },
    ClassificationBand {
        range_start: -10,
        range_end: -6,
        label: Regime::Autocracy,
    },
    ClassificationBand {
        range_start: 6,
        range_end: 10,
        label: Regime::Democracy,
    },
];

/// Label of the band containing `score`, if any.
pub fn classify(score: i32) -> Option<Regime> {
    BANDS.iter().find(|b| b.contains(score)).map(|b| b.label)
}
