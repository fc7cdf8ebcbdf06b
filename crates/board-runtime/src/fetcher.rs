//! HTTP retrieval of the headline page.

use std::time::Duration;

use board_core::error::{BoardError, Result};
use board_core::settings::DEFAULT_SCRAPE_URL;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches the raw bytes of a single page.
pub struct HeadlineFetcher {
    client: reqwest::Client,
    url: String,
}

impl HeadlineFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("batchboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BoardError::Fetch(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetcher for the default page with the default timeout.
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            DEFAULT_SCRAPE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the page. Transport errors, timeouts and non-success statuses
    /// all surface as [`BoardError::Fetch`].
    pub async fn fetch(&self) -> Result<Vec<u8>> {
        tracing::info!(url = %self.url, "connecting");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BoardError::Fetch(describe(&e)))?;

        let response = response
            .error_for_status()
            .map_err(|e| BoardError::Fetch(describe(&e)))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| BoardError::Fetch(describe(&e)))?;
        tracing::debug!(bytes = body.len(), "page fetched");
        Ok(body.to_vec())
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if let Some(status) = err.status() {
        format!("server answered {}", status)
    } else {
        err.to_string()
    }
}
