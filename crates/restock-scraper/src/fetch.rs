use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::ScrapeError;

/// Interval between re-fetches while waiting for a page's required element.
const ELEMENT_POLL_INTERVAL_MS: u64 = 500;

/// Contract for obtaining a page's raw markup.
///
/// `wait_hint` names a marker the page must contain before it is worth
/// parsing; implementations may wait a bounded time for it to appear. A wait
/// that times out is tolerated (logged) and the markup present at that point
/// is returned — it is not an error.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the raw markup at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] on network failure or a non-success HTTP
    /// status. An element-wait timeout is not an error.
    async fn fetch(&self, url: &str, wait_hint: Option<&str>) -> Result<String, ScrapeError>;
}

/// Plain HTTP implementation of [`PageFetcher`].
///
/// Shops that populate listings late (see `ShopKind::wait_hint`) are re-read
/// on a short poll until the marker appears or the bounded wait elapses.
pub struct HttpPageFetcher {
    client: Client,
    element_wait: Duration,
}

impl HttpPageFetcher {
    /// Creates a fetcher with configured timeout, `User-Agent`, and bounded
    /// element wait.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        element_wait_secs: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            element_wait: Duration::from_secs(element_wait_secs),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, wait_hint: Option<&str>) -> Result<String, ScrapeError> {
        let deadline = tokio::time::Instant::now() + self.element_wait;
        let mut body = self.fetch_once(url).await?;

        if let Some(marker) = wait_hint {
            while !body.contains(marker) && tokio::time::Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(ELEMENT_POLL_INTERVAL_MS)).await;
                body = self.fetch_once(url).await?;
            }
            if !body.contains(marker) {
                tracing::warn!(url, marker, "timeout waiting for element; parsing page as-is");
            }
        }

        tracing::info!(url, "page fetched");
        Ok(body)
    }
}
