use std::io::Write;
use std::path::Path;

use reqwest::Url;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{HttpClient, RetryPolicy, fetch_bytes};
use crate::error::Result;
use crate::parser::{RawSheet, parse_spreadsheet};

const DEFAULT_SUFFIX: &str = ".xls";
const STAGED_PREFIX: &str = "polity_trend_";

/// Downloads a workbook and returns its first worksheet.
///
/// The body is staged in a temporary file named after the URL's extension so
/// the workbook format can be detected; the file is removed once parsing ends,
/// whether it succeeded or not.
#[tracing::instrument(skip(client, retry), fields(url = %url))]
pub async fn fetch_spreadsheet<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    retry: &RetryPolicy,
) -> Result<RawSheet> {
    let bytes = fetch_bytes(client, url, retry).await?;
    let suffix = extension_of(url).unwrap_or_else(|| DEFAULT_SUFFIX.to_string());
    let sheet = parse_spreadsheet_bytes(&bytes, &suffix)?;
    info!(rows = sheet.rows.len(), columns = sheet.headers.len(), "Spreadsheet parsed");
    Ok(sheet)
}

/// Parses workbook bytes via a scoped temporary file in the system temp dir.
pub fn parse_spreadsheet_bytes(bytes: &[u8], suffix: &str) -> Result<RawSheet> {
    parse_spreadsheet_bytes_in(&std::env::temp_dir(), bytes, suffix)
}

/// Like [`parse_spreadsheet_bytes`], staging the file under `dir`.
pub fn parse_spreadsheet_bytes_in(dir: &Path, bytes: &[u8], suffix: &str) -> Result<RawSheet> {
    let staged = stage_to_tempfile_in(dir, bytes, suffix)?;
    debug!(path = %staged.path().display(), bytes = bytes.len(), "Spreadsheet staged");
    parse_spreadsheet(staged.path())
}

/// Writes `bytes` to a fresh temporary file that is deleted when dropped.
pub fn stage_to_tempfile(bytes: &[u8], suffix: &str) -> Result<NamedTempFile> {
    stage_to_tempfile_in(&std::env::temp_dir(), bytes, suffix)
}

fn stage_to_tempfile_in(dir: &Path, bytes: &[u8], suffix: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(STAGED_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

fn extension_of(url: &str) -> Option<String> {
    let parsed: Url = url.parse().ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| format!(".{}", ext.to_ascii_lowercase()))
}
