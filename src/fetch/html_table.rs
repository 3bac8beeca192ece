use tracing::info;

use super::{HttpClient, RetryPolicy, fetch_bytes};
use crate::error::Result;
use crate::parser::{Grid, TableQuery, extract_table};

/// Downloads an HTML page and materializes the table selected by `query`.
#[tracing::instrument(skip(client, retry), fields(url = %url, selector = %query.selector, index = query.index))]
pub async fn fetch_html_table<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    query: &TableQuery,
    retry: &RetryPolicy,
) -> Result<Grid> {
    let bytes = fetch_bytes(client, url, retry).await?;
    let html = String::from_utf8_lossy(&bytes);
    let grid = extract_table(&html, query)?;
    info!(
        rows = grid.len(),
        columns = grid.first().map(Vec::len).unwrap_or(0),
        "HTML table extracted"
    );
    Ok(grid)
}
