//! Typed errors for the site-rag library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on the failure class: transient fetch errors, embedding failures,
//! corrupted index artifacts and fatal setup errors.

use thiserror::Error;

/// Errors that can occur while building or serving the knowledge base.
#[derive(Debug, Error)]
pub enum RagError {
    /// Crawl operation failed
    #[error("crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Text generation failed
    #[error("generation error: {0}")]
    Generation(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Content store or index file I/O failed
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Index artifacts exist but cannot be trusted
    #[error("corrupt index: {reason}")]
    CorruptIndex { reason: String },

    /// No chunk produced an embedding during a build
    #[error("no embeddings produced from {chunks} chunks")]
    EmptyIndex { chunks: usize },

    /// Vector has the wrong dimensionality for this index
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Vector contains NaN or infinite components
    #[error("vector has non-finite components")]
    NonFiniteVector,

    /// Fatal setup failure (renderer, directories)
    #[error("setup error: {0}")]
    Setup(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Errors that can occur while fetching a single resource.
///
/// These are per-URL and never abort a crawl on their own.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success HTTP status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Connection or render timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// The rendering engine failed
    #[error("render error: {0}")]
    Render(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, RagError>;

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;
