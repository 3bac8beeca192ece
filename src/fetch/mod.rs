//! Remote fetching: raw bytes, staged spreadsheets, and HTML tables.

mod basic;
mod client;
mod html_table;
mod retry;
mod spreadsheet;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use html_table::fetch_html_table;
pub use retry::RetryPolicy;
pub use spreadsheet::{
    fetch_spreadsheet, parse_spreadsheet_bytes, parse_spreadsheet_bytes_in, stage_to_tempfile,
};

use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

struct Failure {
    reason: String,
    transient: bool,
}

/// GETs `url` and returns the body, retrying transient failures per `retry`.
///
/// Transport errors, 5xx and 429 are retried; any other non-2xx status fails
/// immediately with [`PipelineError::Fetch`].
#[tracing::instrument(skip(client, retry), fields(url = %url))]
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    retry: &RetryPolicy,
) -> Result<Vec<u8>> {
    let parsed: Url = url.parse().map_err(|e| PipelineError::fetch(url, e))?;

    let mut attempt = 1;
    loop {
        match fetch_once(client, &parsed).await {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), attempt, "Fetched");
                return Ok(bytes);
            }
            Err(failure) if failure.transient && attempt < retry.attempts => {
                let delay = retry.delay_for(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %failure.reason,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(failure) => return Err(PipelineError::fetch(url, failure.reason)),
        }
    }
}

async fn fetch_once<C: HttpClient + ?Sized>(
    client: &C,
    url: &Url,
) -> std::result::Result<Vec<u8>, Failure> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req).await.map_err(|e| Failure {
        reason: e.to_string(),
        transient: true,
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Failure {
            reason: format!("HTTP {status}"),
            transient: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
        });
    }

    let bytes = resp.bytes().await.map_err(|e| Failure {
        reason: e.to_string(),
        transient: true,
    })?;
    Ok(bytes.to_vec())
}


#[cfg(test)]
mod tests {
    use super::testing::CannedClient;
    use super::*;
    use std::time::Duration;

    fn fast_retry(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            base_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let client = CannedClient::ok(b"hello");
        let bytes = fetch_bytes(&client, "http://example.test/a", &RetryPolicy::none())
            .await
            .unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_fetch_bytes_retries_server_errors() {
        let client = CannedClient::new(vec![(503, b""), (502, b""), (200, b"ok")]);
        let bytes = fetch_bytes(&client, "http://example.test/a", &fast_retry(3))
            .await
            .unwrap();
        assert_eq!(bytes, b"ok");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_fetch_bytes_does_not_retry_not_found() {
        let client = CannedClient::new(vec![(404, b"missing"), (200, b"ok")]);
        let err = fetch_bytes(&client, "http://example.test/a", &fast_retry(3))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert!(err.to_string().contains("404"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_bytes_gives_up_after_attempts() {
        let client = CannedClient::new(vec![(500, b""), (500, b"")]);
        let err = fetch_bytes(&client, "http://example.test/a", &fast_retry(2))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_bad_url() {
        let client = CannedClient::new(vec![]);
        let err = fetch_bytes(&client, "not a url", &RetryPolicy::none())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert_eq!(client.calls(), 0);
    }
}
