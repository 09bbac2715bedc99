use async_trait::async_trait;
use crate::error::FetchError;

/// Plain GET of a page as text: no auth, no extra headers.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    fn source_name(&self) -> &str;

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}
