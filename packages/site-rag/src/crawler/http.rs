//! Plain HTTP access via `reqwest`.
//!
//! [`HttpFetcher`] downloads PDFs for the crawler. It also implements
//! [`PageRenderer`] for static sites where no script execution is needed,
//! and backs [`scrape_live`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{CrawlError, CrawlResult};
use crate::traits::extractor::TextExtractor;
use crate::traits::fetcher::{DocumentFetcher, PageRenderer, RenderedPage};

/// Default timeout for document downloads and live scrapes.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Live scrapes shorter than this (in characters) count as empty.
const MIN_LIVE_TEXT_CHARS: usize = 50;

/// Browser-like User-Agent to avoid bot detection.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with the default 10 second timeout.
    pub fn new() -> CrawlResult<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> CrawlResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn get(&self, url: &Url) -> CrawlResult<reqwest::Response> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &Url) -> CrawlResult<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;
        debug!(url = %url, bytes = bytes.len(), "Downloaded document");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PageRenderer for HttpFetcher {
    async fn render(&self, url: &Url) -> CrawlResult<RenderedPage> {
        let response = self.get(url).await?;
        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;
        Ok(RenderedPage::new(final_url, html))
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn map_reqwest_error(url: &Url, e: reqwest::Error) -> CrawlError {
    if e.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        CrawlError::Http(Box::new(e))
    }
}

/// Fetch one page right now and return its cleaned text.
///
/// Uses a plain GET (no rendering). Returns `None` on any failure or when
/// the cleaned text is shorter than 50 characters.
pub async fn scrape_live(
    fetcher: &HttpFetcher,
    extractor: &dyn TextExtractor,
    url: &str,
) -> Option<String> {
    let url = Url::parse(url).ok()?;
    info!(url = %url, "Live scraping page");

    let page = match fetcher.render(&url).await {
        Ok(page) => page,
        Err(e) => {
            debug!(url = %url, error = %e, "Live scrape failed");
            return None;
        }
    };

    let text = extractor.clean_markup(&page.html);
    if text.chars().count() < MIN_LIVE_TEXT_CHARS {
        debug!(url = %url, chars = text.len(), "Live scrape returned too little text");
        return None;
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExtractor;

    #[test]
    fn test_default_timeout() {
        let fetcher = HttpFetcher::new().unwrap();
        assert_eq!(fetcher.timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_scrape_live_rejects_invalid_url() {
        let fetcher = HttpFetcher::new().unwrap();
        assert!(scrape_live(&fetcher, &MockExtractor::new(), "not a url")
            .await
            .is_none());
    }
}
