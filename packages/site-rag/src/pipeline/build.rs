//! Index build: load, chunk, embed, persist.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::chunker::Chunker;
use crate::error::{RagError, Result};
use crate::index::{VectorStore, VectorStoreBuilder};
use crate::store::ContentStore;
use crate::traits::embedder::Embedder;
use crate::traits::extractor::TextExtractor;
use crate::types::IndexPaths;

/// Default limit on a single embedding call.
pub const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// The aligned index and texts
    pub store: VectorStore,

    /// Documents loaded from the content store
    pub documents: usize,

    /// Chunks produced before embedding
    pub chunks_total: usize,

    /// Chunks dropped because embedding failed
    pub chunks_dropped: usize,
}

impl BuildReport {
    /// Chunks that made it into the index.
    pub fn chunks_indexed(&self) -> usize {
        self.store.len()
    }
}

/// Builds a [`VectorStore`] from a content store.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    chunker: Chunker,
    embed_timeout: Duration,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            chunker: Chunker::default(),
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
        }
    }
}

impl IndexBuilder {
    pub fn new(chunker: Chunker) -> Self {
        Self {
            chunker,
            ..Default::default()
        }
    }

    /// Set the per-chunk embedding timeout.
    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    /// Load, chunk and embed everything in `content`.
    ///
    /// Chunks whose embedding fails, times out or has the wrong
    /// dimensionality are dropped from both the index and the texts.
    /// Returns [`RagError::EmptyIndex`] when no chunk survives.
    pub async fn build(
        &self,
        content: &ContentStore,
        extractor: &dyn TextExtractor,
        embedder: &dyn Embedder,
    ) -> Result<BuildReport> {
        let documents = content.load_documents(extractor).await?;
        let chunks = self.chunker.chunk_documents(&documents);
        let chunks_total = chunks.len();

        info!(
            documents = documents.len(),
            chunks = chunks_total,
            embedder = embedder.name(),
            "Embedding chunks"
        );

        let mut builder = VectorStoreBuilder::new();
        let mut chunks_dropped = 0;

        for (i, chunk) in chunks.into_iter().enumerate() {
            let embedded =
                match tokio::time::timeout(self.embed_timeout, embedder.embed_document(&chunk.text))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(RagError::Embedding(
                        format!("timed out after {:?}", self.embed_timeout).into(),
                    )),
                };

            let pushed = embedded.and_then(|vector| builder.push(chunk.text, &vector));
            if let Err(e) = pushed {
                warn!(
                    chunk = i,
                    source = %chunk.source_id,
                    error = %e,
                    "Dropping chunk"
                );
                chunks_dropped += 1;
            } else {
                debug!(chunk = i, source = %chunk.source_id, "Embedded chunk");
            }
        }

        let store = builder.finish().ok_or(RagError::EmptyIndex {
            chunks: chunks_total,
        })?;

        info!(
            indexed = store.len(),
            dropped = chunks_dropped,
            dimension = store.dimension(),
            "Built vector store"
        );

        Ok(BuildReport {
            store,
            documents: documents.len(),
            chunks_total,
            chunks_dropped,
        })
    }
}

/// Build the index from `content` and persist both artifacts.
///
/// Nothing is written when the build fails.
pub async fn build_index(
    content: &ContentStore,
    extractor: &dyn TextExtractor,
    embedder: &dyn Embedder,
    builder: &IndexBuilder,
    paths: &IndexPaths,
) -> Result<BuildReport> {
    let report = builder.build(content, extractor, embedder).await?;
    report.store.save(paths).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockEmbedder, MockExtractor};
    use url::Url;

    async fn store_with_pages(dir: &std::path::Path, pages: &[(&str, &str)]) -> ContentStore {
        let store = ContentStore::open(dir).await.unwrap();
        for (url, text) in pages {
            store
                .save_page(&Url::parse(url).unwrap(), text)
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_failed_chunks_are_dropped_from_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let content = store_with_pages(
            dir.path(),
            &[("https://example.edu/a", "alpha"), ("https://example.edu/b", "beta")],
        )
        .await;

        let failing = "Source: https://example.edu/a\n\nalpha";
        let embedder = MockEmbedder::new().failing_on(failing);
        let report = IndexBuilder::default()
            .build(&content, &MockExtractor::new(), &embedder)
            .await
            .unwrap();

        assert_eq!(report.documents, 2);
        assert_eq!(report.chunks_total, 2);
        assert_eq!(report.chunks_dropped, 1);
        assert_eq!(report.chunks_indexed(), 1);
        assert_eq!(report.store.index().len(), report.store.documents().len());
        assert!(report.store.documents()[0].ends_with("beta"));
    }

    #[tokio::test]
    async fn test_wrong_dimension_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let content = store_with_pages(
            dir.path(),
            &[("https://example.edu/a", "alpha"), ("https://example.edu/b", "beta")],
        )
        .await;

        let embedder = MockEmbedder::new()
            .with_embedding("Source: https://example.edu/a\n\nalpha", vec![1.0, 0.0])
            .with_embedding("Source: https://example.edu/b\n\nbeta", vec![1.0, 0.0, 0.0]);
        let report = IndexBuilder::default()
            .build(&content, &MockExtractor::new(), &embedder)
            .await
            .unwrap();

        assert_eq!(report.chunks_dropped, 1);
        assert_eq!(report.store.dimension(), 2);
    }

    #[tokio::test]
    async fn test_non_finite_embedding_is_dropped_and_index_loads() {
        let dir = tempfile::tempdir().unwrap();
        let content = store_with_pages(
            dir.path(),
            &[("https://example.edu/a", "alpha"), ("https://example.edu/b", "beta")],
        )
        .await;
        let paths = IndexPaths::in_dir(dir.path().join("index"));

        let embedder = MockEmbedder::new()
            .with_embedding("Source: https://example.edu/a\n\nalpha", vec![f32::NAN, 0.0])
            .with_embedding("Source: https://example.edu/b\n\nbeta", vec![1.0, 0.0]);
        let report = build_index(
            &content,
            &MockExtractor::new(),
            &embedder,
            &IndexBuilder::default(),
            &paths,
        )
        .await
        .unwrap();

        assert_eq!(report.chunks_dropped, 1);
        let loaded = crate::index::load_store(&paths).await.unwrap();
        assert_eq!(loaded, report.store);
    }

    #[tokio::test]
    async fn test_no_embeddings_is_empty_index_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let content =
            store_with_pages(dir.path(), &[("https://example.edu/a", "alpha")]).await;
        let paths = IndexPaths::in_dir(dir.path().join("index"));

        let err = build_index(
            &content,
            &MockExtractor::new(),
            &MockEmbedder::new().failing(),
            &IndexBuilder::default(),
            &paths,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RagError::EmptyIndex { chunks: 1 }));
        assert!(!paths.index_file.exists());
        assert!(!paths.documents_file.exists());
    }

    #[tokio::test]
    async fn test_empty_content_store_is_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let content = ContentStore::open(dir.path()).await.unwrap();

        let err = IndexBuilder::default()
            .build(&content, &MockExtractor::new(), &MockEmbedder::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::EmptyIndex { chunks: 0 }));
    }
}
