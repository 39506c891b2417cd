//! Site Knowledge Base Library
//!
//! Crawls one website into a local content store, builds a persisted
//! vector index over fixed-size text chunks, and retrieves the chunks
//! nearest to a question as context for an answer step.
//!
//! # Usage
//!
//! ```rust,ignore
//! use site_rag::{ContentStore, CrawlConfig, Crawler, HtmlTextExtractor, IndexBuilder};
//! use site_rag::{build_index, ChromeRenderer, HttpFetcher, IndexPaths, Retriever, StoreHandle};
//!
//! // Crawl
//! let store = ContentStore::open("data").await?;
//! let crawler = Crawler::new(ChromeRenderer::detect()?, HttpFetcher::new()?, HtmlTextExtractor, store);
//! crawler.crawl(&CrawlConfig::new("https://example.edu").with_max_depth(2)).await?;
//!
//! // Build
//! let paths = IndexPaths::in_dir("index");
//! build_index(crawler.store(), &HtmlTextExtractor, &embedder, &IndexBuilder::default(), &paths).await?;
//!
//! // Retrieve
//! let retriever = Retriever::new(embedder, StoreHandle::load(&paths).await);
//! let context = retriever.retrieve("When are fees due?", 5).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for rendering, fetching, extraction, embedding, generation
//! - [`types`] - Configuration and data types
//! - [`crawler`] - BFS crawler, link scope, Chromium and HTTP fetchers
//! - [`store`] - File-based content store
//! - [`chunker`] - Sliding-window chunking
//! - [`index`] - Flat L2 index and paired on-disk artifacts
//! - [`pipeline`] - Index build
//! - [`retriever`] - Query-time context retrieval
//! - [`assistant`] - Answer step over a generator
//! - [`testing`] - Mock implementations for testing

pub mod assistant;
pub mod chunker;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod index;
pub mod pipeline;
pub mod retriever;
pub mod store;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "gemini")]
pub mod gemini;

// Re-export core types at crate root
pub use assistant::Assistant;
pub use chunker::Chunker;
pub use crawler::{scrape_live, ChromeRenderer, CrawlReport, CrawlSession, Crawler, HttpFetcher};
pub use error::{CrawlError, CrawlResult, RagError, Result};
pub use extract::HtmlTextExtractor;
pub use index::{load_store, FlatL2Index, Neighbor, VectorStore, VectorStoreBuilder};
pub use pipeline::{build_index, BuildReport, IndexBuilder};
pub use retriever::{Retriever, StoreHandle};
pub use store::ContentStore;
pub use traits::{
    embedder::Embedder,
    extractor::TextExtractor,
    fetcher::{DocumentFetcher, PageRenderer, RenderedPage},
    generator::Generator,
};
pub use types::{
    Chunk, ChunkConfig, CrawlConfig, DocumentKind, IndexPaths, RetrievalConfig, SourceId,
    StoredDocument,
};
