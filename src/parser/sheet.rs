use std::fmt;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::{PipelineError, Result};

/// A typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Empty => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }
}

/// First worksheet of a workbook: header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// Splits the first row off as headers.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let mut rows = rows.into_iter();
        let headers = rows
            .next()
            .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();
        Self {
            headers,
            rows: rows.collect(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(wanted))
    }
}

/// Reads the first worksheet of the workbook at `path`; the format is picked from the extension.
pub fn parse_spreadsheet(path: &Path) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| PipelineError::Parse(format!("{}: {e}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::Parse("workbook has no worksheets".to_string()))?
        .map_err(|e| PipelineError::Parse(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(Cell::from).collect())
        .collect();

    Ok(RawSheet::from_rows(rows))
}
