//! Data types flowing between the normalizer, the aggregator and the plot.

use serde::{Deserialize, Serialize};

/// One (country, year) observation from the scores dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub entity_code: u32,
    pub year: i32,
    /// `None` when the source cell was blank.
    pub score: Option<i32>,
}

/// One row of the organization membership table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub entity_name: String,
    pub join_date: String,
    pub entity_code: Option<u32>,
}

/// A point of a single country's series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearScore {
    pub year: i32,
    pub score: i32,
}

/// A row of an aggregated series; `mean_score` is `None` when the year had no scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearMean {
    pub year: i32,
    pub mean_score: Option<f64>,
}

/// A plottable line: a name plus `(year, value)` points in ascending year order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub points: Vec<(i32, f64)>,
}

impl NamedSeries {
    pub fn from_scores(name: impl Into<String>, scores: &[YearScore]) -> Self {
        Self {
            name: name.into(),
            points: scores.iter().map(|p| (p.year, p.score as f64)).collect(),
        }
    }

    /// Years without a mean are skipped, leaving the line to bridge them.
    pub fn from_means(name: impl Into<String>, means: &[YearMean]) -> Self {
        Self {
            name: name.into(),
            points: means
                .iter()
                .filter_map(|m| m.mean_score.map(|v| (m.year, v)))
                .collect(),
        }
    }

    pub fn value_at(&self, year: i32) -> Option<f64> {
        self.points.iter().find(|(y, _)| *y == year).map(|(_, v)| *v)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
