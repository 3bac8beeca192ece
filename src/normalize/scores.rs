use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::ScoreRecord;
use crate::error::{PipelineError, Result};
use crate::parser::{Cell, RawSheet};

pub const SCORE_MIN: i32 = -10;
pub const SCORE_MAX: i32 = 10;

/// Source header names of the three columns kept from the scores workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreColumns {
    pub code: String,
    pub year: String,
    pub score: String,
}

impl Default for ScoreColumns {
    fn default() -> Self {
        Self {
            code: "ccode".to_string(),
            year: "year".to_string(),
            score: "polity".to_string(),
        }
    }
}

/// Selects, renames and coerces the scores worksheet.
///
/// Rows before `cutoff_year` and rows whose score falls outside
/// [`SCORE_MIN`]..=[`SCORE_MAX`] (e.g. the -66/-77/-88 special codes) are
/// dropped. A blank score cell becomes a missing score; any other
/// non-integer cell is a [`PipelineError::TypeCoercion`].
pub fn normalize_scores(
    sheet: &RawSheet,
    columns: &ScoreColumns,
    cutoff_year: i32,
) -> Result<Vec<ScoreRecord>> {
    let code_idx = require_column(sheet, &columns.code)?;
    let year_idx = require_column(sheet, &columns.year)?;
    let score_idx = require_column(sheet, &columns.score)?;

    let mut out = Vec::new();
    let mut before_cutoff = 0usize;
    let mut out_of_range = 0usize;
    let mut missing = 0usize;

    for (i, row) in sheet.rows.iter().enumerate() {
        // header is row 1
        let row_no = i + 2;
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).unwrap_or(&Cell::Empty);

        let code = coerce_int(cell(code_idx), &columns.code, row_no)?;
        let year = coerce_int(cell(year_idx), &columns.year, row_no)?;
        let score_cell = cell(score_idx);
        let score = if score_cell.is_blank() {
            None
        } else {
            Some(coerce_int(score_cell, &columns.score, row_no)?)
        };

        if year < cutoff_year as i64 {
            before_cutoff += 1;
            continue;
        }
        let score = match score {
            Some(s) if !(SCORE_MIN as i64..=SCORE_MAX as i64).contains(&s) => {
                out_of_range += 1;
                continue;
            }
            Some(s) => Some(s as i32),
            None => {
                missing += 1;
                None
            }
        };

        out.push(ScoreRecord {
            entity_code: narrow(code, cell(code_idx), &columns.code, row_no)?,
            year: narrow(year, cell(year_idx), &columns.year, row_no)?,
            score,
        });
    }

    info!(
        kept = out.len(),
        before_cutoff,
        out_of_range,
        missing,
        cutoff_year,
        "Scores normalized"
    );
    Ok(out)
}

fn require_column(sheet: &RawSheet, name: &str) -> Result<usize> {
    sheet.column_index(name).ok_or_else(|| {
        PipelineError::Parse(format!(
            "scores sheet has no `{name}` column (found: {})",
            sheet.headers.join(", ")
        ))
    })
}

fn coercion_error(cell: &Cell, column: &str, row: usize) -> PipelineError {
    PipelineError::TypeCoercion {
        column: column.to_string(),
        row,
        value: cell.to_string(),
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn coerce_int(cell: &Cell, column: &str, row: usize) -> Result<i64> {
    let value = match cell {
        Cell::Number(n) => integral(*n),
        Cell::Text(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().and_then(integral))
        }
        Cell::Empty => None,
    };
    value.ok_or_else(|| coercion_error(cell, column, row))
}

fn narrow<T: TryFrom<i64>>(value: i64, cell: &Cell, column: &str, row: usize) -> Result<T> {
    T::try_from(value).map_err(|_| coercion_error(cell, column, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sheet(rows: Vec<Vec<Cell>>) -> RawSheet {
        let mut all = vec![vec![
            t("scode"),
            t("ccode"),
            t("country"),
            t("year"),
            t("polity"),
        ]];
        all.extend(rows);
        RawSheet::from_rows(all)
    }

    fn row(code: f64, year: f64, score: Cell) -> Vec<Cell> {
        vec![t("XXX"), n(code), t("Somewhere"), n(year), score]
    }

    #[test]
    fn test_cutoff_drops_early_years() {
        let sheet = sheet(vec![
            row(2.0, 1999.0, n(10.0)),
            row(2.0, 2000.0, n(10.0)),
            row(2.0, 2016.0, n(10.0)),
            row(2.0, 2017.0, n(8.0)),
        ]);
        let records = normalize_scores(&sheet, &ScoreColumns::default(), 2000).unwrap();
        let years: Vec<_> = records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2000, 2016, 2017]);
        assert!(records.iter().all(|r| r.entity_code == 2));
    }

    #[test]
    fn test_out_of_range_scores_filtered_not_clamped() {
        let sheet = sheet(vec![
            row(310.0, 2005.0, n(-88.0)),
            row(310.0, 2006.0, n(-66.0)),
            row(310.0, 2007.0, n(11.0)),
            row(310.0, 2008.0, n(-10.0)),
            row(310.0, 2009.0, n(10.0)),
        ]);
        let records = normalize_scores(&sheet, &ScoreColumns::default(), 2000).unwrap();
        assert_eq!(records.len(), 2);
        for r in &records {
            let s = r.score.unwrap();
            assert!((SCORE_MIN..=SCORE_MAX).contains(&s));
            assert!(r.year >= 2000);
        }
    }

    #[test]
    fn test_text_cells_are_trimmed_and_parsed() {
        let sheet = sheet(vec![vec![t("HUN"), t(" 310 "), t("Hungary"), t("2010"), t(" -7 ")]]);
        let records = normalize_scores(&sheet, &ScoreColumns::default(), 2000).unwrap();
        assert_eq!(
            records,
            vec![ScoreRecord {
                entity_code: 310,
                year: 2010,
                score: Some(-7)
            }]
        );
    }

    #[test]
    fn test_blank_score_is_missing() {
        let sheet = sheet(vec![row(2.0, 2001.0, Cell::Empty), row(2.0, 2002.0, t("  "))]);
        let records = normalize_scores(&sheet, &ScoreColumns::default(), 2000).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.score.is_none()));
    }

    #[test]
    fn test_non_numeric_is_coercion_error() {
        let sheet = sheet(vec![row(2.0, 2001.0, n(9.0)), row(2.0, 2002.0, t("n/a"))]);
        let err = normalize_scores(&sheet, &ScoreColumns::default(), 2000).unwrap_err();
        match err {
            PipelineError::TypeCoercion { column, row, value } => {
                assert_eq!(column, "polity");
                assert_eq!(row, 3);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fractional_year_is_coercion_error() {
        let sheet = sheet(vec![row(2.0, 2001.5, n(9.0))]);
        let err = normalize_scores(&sheet, &ScoreColumns::default(), 2000).unwrap_err();
        assert!(matches!(err, PipelineError::TypeCoercion { .. }));
    }

    #[test]
    fn test_negative_code_is_coercion_error() {
        let sheet = sheet(vec![row(-2.0, 2001.0, n(9.0))]);
        let err = normalize_scores(&sheet, &ScoreColumns::default(), 2000).unwrap_err();
        assert!(matches!(err, PipelineError::TypeCoercion { ref column, .. } if column == "ccode"));
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let columns = ScoreColumns {
            score: "polity2".to_string(),
            ..ScoreColumns::default()
        };
        let err = normalize_scores(&sheet(vec![]), &columns, 2000).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let sheet = sheet(vec![
            row(2.0, 2001.0, n(9.0)),
            vec![Cell::Empty, Cell::Empty, t(" "), Cell::Empty, Cell::Empty],
        ]);
        let records = normalize_scores(&sheet, &ScoreColumns::default(), 2000).unwrap();
        assert_eq!(records.len(), 1);
    }
}
