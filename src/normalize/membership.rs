use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::MembershipRecord;
use crate::countries::CountryResolver;
use crate::error::{PipelineError, Result};
use crate::parser::Grid;

/// Zero-based positions of the country-name and join-date columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipColumns {
    pub name: usize,
    pub join_date: usize,
}

impl Default for MembershipColumns {
    fn default() -> Self {
        Self {
            name: 1,
            join_date: 2,
        }
    }
}

/// Cleans the scraped membership table and resolves each country to a code.
///
/// The grid's first row holds placeholder headers. Of the rows below it, the
/// first repeats the header text and the last is a footnote; both are dropped.
/// Rows with an empty name are skipped. Names the resolver does not know are
/// kept with `entity_code: None` and logged.
pub fn normalize_membership(
    grid: &Grid,
    columns: MembershipColumns,
    resolver: &dyn CountryResolver,
) -> Result<Vec<MembershipRecord>> {
    let width = grid.first().map(Vec::len).unwrap_or(0);
    let needed = columns.name.max(columns.join_date);
    if !grid.is_empty() && needed >= width {
        return Err(PipelineError::Parse(format!(
            "membership table has {width} columns, column {needed} requested"
        )));
    }

    let body = grid.get(1..).unwrap_or(&[]);
    let between = if body.len() > 2 {
        &body[1..body.len() - 1]
    } else {
        &[]
    };

    let mut records = Vec::new();
    let mut unresolved = 0usize;

    for row in between {
        let entity_name = strip_footnotes(cell(row, columns.name));
        if entity_name.is_empty() {
            continue;
        }
        let join_date = strip_footnotes(cell(row, columns.join_date));

        let entity_code = resolver.name_to_code(&entity_name);
        if entity_code.is_none() {
            unresolved += 1;
            let err = PipelineError::UnresolvedEntity {
                name: entity_name.clone(),
            };
            warn!(error = %err, "Membership row kept without a country code");
        }

        records.push(MembershipRecord {
            entity_name,
            join_date,
            entity_code,
        });
    }

    info!(members = records.len(), unresolved, "Membership normalized");
    Ok(records)
}

/// Resolved codes of the membership table.
pub fn membership_codes(records: &[MembershipRecord]) -> BTreeSet<u32> {
    records.iter().filter_map(|r| r.entity_code).collect()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Drops `[..]` reference markers and trims.
fn strip_footnotes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for ch in raw.chars() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::CountryRegistry;

    fn registry() -> CountryRegistry {
        CountryRegistry::from_reader(
            "code,name,aliases\n2,United States of America,USA\n310,Hungary,\n".as_bytes(),
        )
        .unwrap()
    }

    fn grid(rows: &[&[&str]]) -> Grid {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        rows.iter()
            .map(|r| {
                let mut row: Vec<String> = r.iter().map(|s| s.to_string()).collect();
                row.resize(width, String::new());
                row
            })
            .collect()
    }

    #[test]
    fn test_drops_header_and_footnote_rows() {
        let grid = grid(&[
            &["", "", ""],
            &["Header", "Header2", ""],
            &["", "USA", "2000"],
            &["", "Hungary", "1996"],
            &["Note: membership can change", ""],
        ]);
        let records =
            normalize_membership(&grid, MembershipColumns::default(), &registry()).unwrap();
        let pairs: Vec<_> = records
            .iter()
            .map(|r| (r.entity_name.as_str(), r.join_date.as_str()))
            .collect();
        assert_eq!(pairs, vec![("USA", "2000"), ("Hungary", "1996")]);
        assert_eq!(records[0].entity_code, Some(2));
        assert_eq!(records[1].entity_code, Some(310));
    }

    #[test]
    fn test_ragged_rows_read_as_blank_cells() {
        let raw: Grid = vec![
            vec![String::new(), String::new(), String::new()],
            vec!["Header".into(), "Header2".into(), String::new()],
            vec![String::new(), "USA".into(), "2000".into()],
            vec![String::new(), "Hungary".into()],
            vec![String::new()],
            vec!["Note: membership can change".into(), String::new()],
        ];
        let records =
            normalize_membership(&raw, MembershipColumns::default(), &registry()).unwrap();
        let pairs: Vec<_> = records
            .iter()
            .map(|r| (r.entity_name.as_str(), r.join_date.as_str()))
            .collect();
        assert_eq!(pairs, vec![("USA", "2000"), ("Hungary", "")]);
    }

    #[test]
    fn test_unresolved_name_is_kept_without_code() {
        let grid = grid(&[
            &["", "", ""],
            &["Flag", "Country", "Joined"],
            &["", "Atlantis", "1949"],
            &["", "Hungary[a]", "12 March 1999[3]"],
            &["footnote", "", ""],
        ]);
        let records =
            normalize_membership(&grid, MembershipColumns::default(), &registry()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity_code, None);
        assert_eq!(records[1].entity_name, "Hungary");
        assert_eq!(records[1].join_date, "12 March 1999");
        assert_eq!(membership_codes(&records).into_iter().collect::<Vec<_>>(), vec![310]);
    }

    #[test]
    fn test_empty_names_skipped() {
        let grid = grid(&[
            &["", "", ""],
            &["h", "h", "h"],
            &["", "  ", "1999"],
            &["", "USA", "1949"],
            &["footnote", "", ""],
        ]);
        let records =
            normalize_membership(&grid, MembershipColumns::default(), &registry()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| !r.entity_name.is_empty()));
    }

    #[test]
    fn test_too_few_rows_yield_nothing() {
        let grid = grid(&[&["", "", ""], &["Header", "Header2", ""], &["note", "", ""]]);
        let records =
            normalize_membership(&grid, MembershipColumns::default(), &registry()).unwrap();
        assert!(records.is_empty());
        let empty: Grid = Vec::new();
        assert!(
            normalize_membership(&empty, MembershipColumns::default(), &registry())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_narrow_table_is_parse_error() {
        let grid = grid(&[&["", ""], &["a", "b"], &["c", "d"], &["e", "f"]]);
        let err =
            normalize_membership(&grid, MembershipColumns::default(), &registry()).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }
}
