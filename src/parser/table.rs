use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Rectangular table of cell texts; every row has the same length.
pub type Grid = Vec<Vec<String>>;

const MAX_SPAN: usize = 1000;

/// Positional query: the `index`-th element matching a CSS `selector`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    pub selector: String,
    pub index: usize,
}

impl TableQuery {
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }
}

struct Span {
    text: String,
    rows_left: usize,
}

/// Finds the table selected by `query` in `html` and materializes it.
///
/// `colspan` repeats a cell across columns, `rowspan` carries it into the rows
/// below, and ragged rows are padded with empty strings to the widest row.
pub fn extract_table(html: &str, query: &TableQuery) -> Result<Grid> {
    let table_sel = parse_selector(&query.selector)?;
    let row_sel = parse_selector("tr")?;

    let document = Html::parse_document(html);
    let table = document
        .select(&table_sel)
        .nth(query.index)
        .ok_or_else(|| PipelineError::SelectorNotFound {
            selector: query.selector.clone(),
            index: query.index,
        })?;

    let mut grid: Grid = Vec::new();
    let mut pending: Vec<Option<Span>> = Vec::new();

    for tr in table.select(&row_sel) {
        let mut row = Vec::new();
        let mut col = 0usize;

        let cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| matches!(e.value().name(), "td" | "th"));

        for cell in cells {
            while let Some(text) = take_pending(&mut pending, col) {
                row.push(text);
                col += 1;
            }

            let text = cell_text(cell);
            let colspan = span_attr(cell, "colspan");
            let rowspan = span_attr(cell, "rowspan");

            for _ in 0..colspan {
                if rowspan > 1 {
                    if pending.len() <= col {
                        pending.resize_with(col + 1, || None);
                    }
                    pending[col] = Some(Span {
                        text: text.clone(),
                        rows_left: rowspan - 1,
                    });
                }
                row.push(text.clone());
                col += 1;
            }
        }

        while col < pending.len() {
            row.push(take_pending(&mut pending, col).unwrap_or_default());
            col += 1;
        }

        grid.push(row);
    }

    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut grid {
        row.resize(width, String::new());
    }

    Ok(grid)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| PipelineError::Parse(format!("invalid selector `{selector}`: {e}")))
}

fn take_pending(pending: &mut [Option<Span>], col: usize) -> Option<String> {
    let slot = pending.get_mut(col)?;
    let span = slot.as_mut()?;
    let text = span.text.clone();
    span.rows_left -= 1;
    if span.rows_left == 0 {
        *slot = None;
    }
    Some(text)
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
        .min(MAX_SPAN)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let raw: String = cell.text().collect();
    raw.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(selector: &str, index: usize) -> TableQuery {
        TableQuery::new(selector, index)
    }

    #[test]
    fn test_selects_by_position() {
        let html = r#"<table><tr><td>first</td></tr></table>
                      <table><tr><td>second</td></tr></table>"#;
        assert_eq!(extract_table(html, &q("table", 0)).unwrap(), vec![vec!["first"]]);
        assert_eq!(extract_table(html, &q("table", 1)).unwrap(), vec![vec!["second"]]);
    }

    #[test]
    fn test_no_match_is_selector_not_found() {
        let html = "<p>no tables here</p>";
        let err = extract_table(html, &q("table.wikitable", 0)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SelectorNotFound { ref selector, index: 0 } if selector == "table.wikitable"
        ));
    }

    #[test]
    fn test_invalid_selector_is_parse_error() {
        let err = extract_table("<table></table>", &q("table[", 0)).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let html = r#"<table>
            <tr><th>a</th><th>b</th><th>c</th></tr>
            <tr><td>1</td></tr>
            <tr></tr>
        </table>"#;
        let grid = extract_table(html, &q("table", 0)).unwrap();
        assert_eq!(
            grid,
            vec![vec!["a", "b", "c"], vec!["1", "", ""], vec!["", "", ""]]
        );
    }

    #[test]
    fn test_colspan_and_rowspan() {
        let html = r#"<table>
            <tr><td rowspan="2">Enlargement 1</td><td>Greece</td><td>1952</td></tr>
            <tr><td>Turkey</td><td>1952</td></tr>
            <tr><td colspan="3">Footnote</td></tr>
        </table>"#;
        let grid = extract_table(html, &q("table", 0)).unwrap();
        assert_eq!(
            grid,
            vec![
                vec!["Enlargement 1", "Greece", "1952"],
                vec!["Enlargement 1", "Turkey", "1952"],
                vec!["Footnote", "Footnote", "Footnote"],
            ]
        );
    }

    #[test]
    fn test_cell_text_is_normalized() {
        let html = "<table><tr><td>  United&nbsp;States <sup>[a]</sup>\n</td></tr></table>";
        let grid = extract_table(html, &q("table", 0)).unwrap();
        assert_eq!(grid, vec![vec!["United States [a]"]]);
    }
}
