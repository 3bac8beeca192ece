//! Output formatting and persistence for derived tables.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use std::fs::File;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::{NamedSeries, YearMean, YearScore};

/// One row of the long-format series export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub series: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Flattens the target, the peer average and any named peers into rows.
pub fn series_rows(
    target_name: &str,
    target: &[YearScore],
    average_name: &str,
    average: &[YearMean],
    peers: &[NamedSeries],
) -> Vec<SeriesRow> {
    let target_rows = target.iter().map(|p| SeriesRow {
        series: target_name.to_string(),
        year: p.year,
        value: Some(p.score as f64),
    });
    let average_rows = average.iter().map(|m| SeriesRow {
        series: average_name.to_string(),
        year: m.year,
        value: m.mean_score,
    });
    let peer_rows = peers.iter().flat_map(|s| {
        s.points.iter().map(|&(year, value)| SeriesRow {
            series: s.name.clone(),
            year,
            value: Some(value),
        })
    });
    target_rows.chain(average_rows).chain(peer_rows).collect()
}

/// Summary of a pipeline run, written as JSON next to the chart.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub target_code: u32,
    pub target_name: String,
    pub cutoff_year: i32,
    pub members: usize,
    pub unresolved_members: Vec<String>,
    pub target_years: usize,
    pub peer_years: usize,
    pub named_peers: Vec<String>,
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `value` as pretty-printed JSON to `path`, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes `rows` to a CSV file with a header row, replacing any existing file.
pub fn write_records<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "CSV written");
    Ok(())
}
