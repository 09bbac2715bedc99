use crate::error::FetchError;
use crate::traits::PageFetcher;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct BookMyShowClient {
    client: Arc<Client>,
}

impl BookMyShowClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl PageFetcher for BookMyShowClient {
    fn source_name(&self) -> &str {
        "bookmyshow"
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        // Error pages are still classified; they simply carry no booking markers
        if !status.is_success() {
            warn!(
                operation = "fetch_page",
                url = %url,
                status = status.as_u16(),
                "Page returned non-success status"
            );
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        debug!(
            operation = "fetch_page",
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "Fetched page"
        );

        Ok(body)
    }
}
