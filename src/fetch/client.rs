use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam for every download; swapped for canned clients in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
