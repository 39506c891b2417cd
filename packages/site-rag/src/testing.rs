//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the site-rag library
//! without launching a browser or making real embedding or generation calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, RwLock};
use url::Url;

use crate::error::{CrawlError, CrawlResult, RagError, Result};
use crate::traits::{
    embedder::Embedder,
    extractor::TextExtractor,
    fetcher::{DocumentFetcher, PageRenderer, RenderedPage},
    generator::Generator,
};

/// A mock embedder for testing.
///
/// Texts with a predefined vector get that vector; everything else gets a
/// deterministic vector derived from a hash of the text.
#[derive(Default)]
pub struct MockEmbedder {
    /// Predefined embeddings by text
    embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,

    /// Texts whose embedding call fails
    failures: Arc<RwLock<HashSet<String>>>,

    /// Fail every call
    fail_all: bool,

    /// Default embedding dimension
    dimension: usize,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockEmbedCall>>>,
}

/// Record of a call made to the mock embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEmbedCall {
    Document { text: String },
    Query { text: String },
}

impl MockEmbedder {
    /// Create a new mock embedder with 8-dimensional default vectors.
    pub fn new() -> Self {
        Self {
            dimension: 8,
            ..Default::default()
        }
    }

    /// Set the default embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Add a predefined embedding for text.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// Make embedding `text` fail.
    pub fn failing_on(self, text: impl Into<String>) -> Self {
        self.failures.write().unwrap().insert(text.into());
        self
    }

    /// Make every call fail.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockEmbedCall> {
        self.calls.read().unwrap().clone()
    }

    /// Generate a deterministic embedding based on text.
    fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let hash = Sha256::digest(text.as_bytes());
        (0..self.dimension)
            .map(|i| (hash[i % 32] as f32 / 127.5) - 1.0)
            .collect()
    }

    fn lookup(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_all || self.failures.read().unwrap().contains(text) {
            return Err(RagError::Embedding(
                format!("mock embedding failure for {} chars", text.len()).into(),
            ));
        }
        Ok(self
            .embeddings
            .read()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.deterministic_embedding(text)))
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.write().unwrap().push(MockEmbedCall::Document {
            text: text.to_string(),
        });
        self.lookup(text)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.write().unwrap().push(MockEmbedCall::Query {
            text: text.to_string(),
        });
        self.lookup(text)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock page renderer serving canned HTML by URL.
///
/// Unknown URLs fail with a 404 status error.
#[derive(Default)]
pub struct MockRenderer {
    /// HTML by URL
    pages: Arc<RwLock<HashMap<String, String>>>,

    /// Redirect targets by URL
    redirects: Arc<RwLock<HashMap<String, String>>>,

    /// URLs that time out
    timeouts: Arc<RwLock<HashSet<String>>>,

    /// Fail `ensure_ready`
    unavailable: bool,

    /// URLs rendered, in order
    rendered: Arc<RwLock<Vec<String>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }

    /// Redirect `from` to `to`; the served HTML is the target's.
    pub fn with_redirect(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects.write().unwrap().insert(from.into(), to.into());
        self
    }

    /// Make rendering `url` time out.
    pub fn with_timeout(self, url: impl Into<String>) -> Self {
        self.timeouts.write().unwrap().insert(url.into());
        self
    }

    /// Make the engine fail to start.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// URLs rendered so far, in order.
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.read().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, url: &Url) -> CrawlResult<RenderedPage> {
        self.rendered.write().unwrap().push(url.to_string());

        if self.timeouts.read().unwrap().contains(url.as_str()) {
            return Err(CrawlError::Timeout {
                url: url.to_string(),
            });
        }

        let final_url = match self.redirects.read().unwrap().get(url.as_str()) {
            Some(target) => Url::parse(target).map_err(|_| CrawlError::InvalidUrl {
                url: target.clone(),
            })?,
            None => url.clone(),
        };

        let html = self.pages.read().unwrap().get(final_url.as_str()).cloned();
        match html {
            Some(html) => Ok(RenderedPage::new(final_url, html)),
            None => Err(CrawlError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn ensure_ready(&self) -> CrawlResult<()> {
        if self.unavailable {
            return Err(CrawlError::Render("mock renderer unavailable".into()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock document fetcher serving canned bytes by URL.
///
/// Clones share state, so a test can keep a handle after moving one into
/// a crawler.
#[derive(Clone, Default)]
pub struct MockFetcher {
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` at `url`.
    pub fn with_document(self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(url.into(), bytes.into());
        self
    }

    /// URLs fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.read().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for MockFetcher {
    async fn fetch_bytes(&self, url: &Url) -> CrawlResult<Vec<u8>> {
        self.fetched.write().unwrap().push(url.to_string());
        self.documents
            .read()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| CrawlError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// A mock extractor: markup passes through unchanged and every PDF yields
/// the same configured text.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    pdf_text: String,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text returned for every PDF.
    pub fn with_pdf_text(mut self, text: impl Into<String>) -> Self {
        self.pdf_text = text.into();
        self
    }
}

impl TextExtractor for MockExtractor {
    fn clean_markup(&self, raw_html: &str) -> String {
        raw_html.trim().to_string()
    }

    fn extract_pdf_text(&self, _path: &Path) -> String {
        self.pdf_text.clone()
    }
}

/// A mock generator returning a fixed reply and recording prompts.
#[derive(Default)]
pub struct MockGenerator {
    reply: String,
    fail: bool,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockGenerator {
    /// Reply with `reply` to every prompt.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Default::default()
        }
    }

    /// Make every call fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.write().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(RagError::Generation("mock generation failure".into()));
        }
        Ok(self.reply.clone())
    }
}
