//! Query-time retrieval over the current vector store.
//!
//! The loaded store is immutable. A rebuild is picked up by swapping a new
//! `Arc<VectorStore>` into the [`StoreHandle`]; readers that already hold
//! the old one keep using it until they finish.

use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::index::{load_store, VectorStore};
use crate::traits::embedder::Embedder;
use crate::types::{IndexPaths, RetrievalConfig};

/// Separator between retrieved chunks in a context string.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Shared, swappable reference to the loaded knowledge base.
#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
    inner: Arc<RwLock<Option<Arc<VectorStore>>>>,
}

impl StoreHandle {
    /// A handle with no knowledge base.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_store(store: VectorStore) -> Self {
        let handle = Self::default();
        handle.replace(Some(store));
        handle
    }

    /// Load the artifacts at `paths`; absent or unusable artifacts give an
    /// empty handle.
    pub async fn load(paths: &IndexPaths) -> Self {
        let handle = Self::default();
        handle.replace(load_store(paths).await);
        handle
    }

    /// Re-read the artifacts and swap them in. Returns true if a store is
    /// now loaded.
    pub async fn reload(&self, paths: &IndexPaths) -> bool {
        let store = load_store(paths).await;
        let loaded = store.is_some();
        self.replace(store);
        loaded
    }

    /// Swap in a new store (or clear it).
    pub fn replace(&self, store: Option<VectorStore>) {
        let store = store.map(Arc::new);
        match self.inner.write() {
            Ok(mut guard) => *guard = store,
            Err(poisoned) => *poisoned.into_inner() = store,
        }
    }

    /// The store as of now.
    pub fn current(&self) -> Option<Arc<VectorStore>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }
}

/// Embeds a question and joins the nearest chunks into a context string.
pub struct Retriever<E> {
    embedder: E,
    store: StoreHandle,
    config: RetrievalConfig,
}

impl<E: Embedder> Retriever<E> {
    pub fn new(embedder: E, store: StoreHandle) -> Self {
        Self {
            embedder,
            store,
            config: RetrievalConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Context for `query` using the configured `top_k`.
    pub async fn context(&self, query: &str) -> String {
        self.retrieve(query, self.config.top_k).await
    }

    /// The `k` closest chunks joined with a blank line, closest first.
    ///
    /// Returns an empty string when no store is loaded, the query cannot
    /// be embedded or nothing matches.
    pub async fn retrieve(&self, query: &str, k: usize) -> String {
        let Some(store) = self.store.current() else {
            debug!("No knowledge base loaded");
            return String::new();
        };

        let vector = match self.embedder.embed_query(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Failed to embed query");
                return String::new();
            }
        };

        let neighbors = match store.search(&vector, k) {
            Ok(neighbors) => neighbors,
            Err(e) => {
                warn!(error = %e, "Search failed");
                return String::new();
            }
        };

        let texts: Vec<&str> = neighbors
            .iter()
            .filter_map(|n| store.document(n.position))
            .collect();
        debug!(k, hits = texts.len(), "Retrieved context");
        texts.join(CONTEXT_SEPARATOR)
    }
}
