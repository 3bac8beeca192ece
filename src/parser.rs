//! Decoders for the two raw source formats: workbooks and HTML tables.

mod sheet;
mod table;

pub use sheet::{Cell, RawSheet, parse_spreadsheet};
pub use table::{Grid, TableQuery, extract_table};
