//! Network access traits used by the crawler.
//!
//! Pages go through a [`PageRenderer`] so client-side rendered content is
//! captured; PDFs go through a lightweight [`DocumentFetcher`].

use async_trait::async_trait;
use url::Url;

use crate::error::CrawlResult;

/// The DOM snapshot of a rendered page.
///
/// Text and links for a page are both taken from `html`, so they always
/// describe the same snapshot.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL after redirects (base for resolving relative links)
    pub final_url: Url,

    /// Serialized DOM after scripts ran and the settle delay elapsed
    pub html: String,
}

impl RenderedPage {
    /// Create a rendered page.
    pub fn new(final_url: Url, html: impl Into<String>) -> Self {
        Self {
            final_url,
            html: html.into(),
        }
    }
}

/// Render-capable page fetch.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load a page, let client-side scripts settle, return the DOM.
    async fn render(&self, url: &Url) -> CrawlResult<RenderedPage>;

    /// Check the rendering engine can start.
    ///
    /// Called once before a crawl; an error here is fatal for the crawl.
    async fn ensure_ready(&self) -> CrawlResult<()> {
        Ok(())
    }

    /// Get the renderer name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Plain HTTP GET for binary documents.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Download a resource body. Non-success statuses are errors.
    async fn fetch_bytes(&self, url: &Url) -> CrawlResult<Vec<u8>>;
}
