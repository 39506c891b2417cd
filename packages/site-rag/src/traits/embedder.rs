//! Embedder trait for turning text into vectors.
//!
//! Document and query embeddings may use different task instructions on
//! the provider side but must land in the same vector space.

use async_trait::async_trait;

use crate::error::Result;

/// Maps a single text unit to a fixed-dimensionality vector.
///
/// Every call is fallible (rate limits, size limits, transient network
/// errors) and callers are expected to recover per call.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a chunk of stored content.
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a user question.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedder name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<E: Embedder + ?Sized> Embedder for std::sync::Arc<E> {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_document(text).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_query(text).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
