//! The vector store: a flat index plus the positionally aligned chunk texts.
//!
//! `documents[i]` is the text whose embedding sits at position `i` of the
//! index. The two halves are persisted as separate artifacts that are
//! always written and loaded as a pair; each records the chunk count and
//! a digest of the text sequence so a mismatched pair is caught on load.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{RagError, Result};
use crate::index::flat::{FlatL2Index, Neighbor};
use crate::types::IndexPaths;

const ARTIFACT_VERSION: u32 = 1;

/// Immutable, searchable knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStore {
    index: FlatL2Index,
    documents: Vec<String>,
}

impl VectorStore {
    /// Pair an index with its texts, rejecting a length mismatch.
    pub fn new(index: FlatL2Index, documents: Vec<String>) -> Result<Self> {
        if index.len() != documents.len() {
            return Err(RagError::CorruptIndex {
                reason: format!(
                    "{} vectors but {} documents",
                    index.len(),
                    documents.len()
                ),
            });
        }
        Ok(Self { index, documents })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn index(&self) -> &FlatL2Index {
        &self.index
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Text at an index position, if in range.
    pub fn document(&self, position: usize) -> Option<&str> {
        self.documents.get(position).map(String::as_str)
    }

    /// Top-k nearest chunks, closest first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.index.search(query, k)
    }

    /// Write both artifacts.
    ///
    /// Each is written to a temporary sibling and renamed into place, so a
    /// reader never sees a half-written file.
    pub async fn save(&self, paths: &IndexPaths) -> Result<()> {
        let digest = documents_digest(&self.documents);

        let index_artifact = IndexArtifact {
            version: ARTIFACT_VERSION,
            dimension: self.index.dimension(),
            count: self.index.len(),
            documents_digest: digest.clone(),
            vectors: self.index.as_raw().to_vec(),
        };
        let documents_artifact = DocumentsArtifact {
            version: ARTIFACT_VERSION,
            count: self.documents.len(),
            documents_digest: digest,
            documents: self.documents.clone(),
        };

        let index_json = serde_json::to_vec(&index_artifact)?;
        let documents_json = serde_json::to_vec(&documents_artifact)?;

        for path in [&paths.index_file, &paths.documents_file] {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let index_tmp = tmp_path(&paths.index_file);
        let documents_tmp = tmp_path(&paths.documents_file);
        tokio::fs::write(&index_tmp, index_json).await?;
        tokio::fs::write(&documents_tmp, documents_json).await?;
        tokio::fs::rename(&index_tmp, &paths.index_file).await?;
        tokio::fs::rename(&documents_tmp, &paths.documents_file).await?;

        info!(
            index = %paths.index_file.display(),
            documents = %paths.documents_file.display(),
            chunks = self.len(),
            dimension = self.dimension(),
            "Saved vector store"
        );
        Ok(())
    }

    /// Read and cross-check both artifacts.
    pub async fn load(paths: &IndexPaths) -> Result<Self> {
        let index_bytes = tokio::fs::read(&paths.index_file).await?;
        let documents_bytes = tokio::fs::read(&paths.documents_file).await?;

        let index_artifact: IndexArtifact =
            serde_json::from_slice(&index_bytes).map_err(|e| corrupt(&paths.index_file, e))?;
        let documents_artifact: DocumentsArtifact = serde_json::from_slice(&documents_bytes)
            .map_err(|e| corrupt(&paths.documents_file, e))?;

        if index_artifact.version != ARTIFACT_VERSION
            || documents_artifact.version != ARTIFACT_VERSION
        {
            return Err(RagError::CorruptIndex {
                reason: format!(
                    "unsupported artifact versions {} / {}",
                    index_artifact.version, documents_artifact.version
                ),
            });
        }

        let index = FlatL2Index::from_raw(index_artifact.dimension, index_artifact.vectors)?;
        let documents = documents_artifact.documents;

        if index.len() != index_artifact.count || documents.len() != documents_artifact.count {
            return Err(RagError::CorruptIndex {
                reason: "artifact contents disagree with their recorded counts".into(),
            });
        }

        let digest = documents_digest(&documents);
        if digest != documents_artifact.documents_digest
            || digest != index_artifact.documents_digest
        {
            return Err(RagError::CorruptIndex {
                reason: "index and documents were not written together".into(),
            });
        }

        Self::new(index, documents)
    }
}

/// Load the store if present and consistent.
///
/// Absent artifacts are the normal "no knowledge base" state. Malformed or
/// inconsistent artifacts log a warning and are treated the same way, so
/// misaligned results are never served.
pub async fn load_store(paths: &IndexPaths) -> Option<VectorStore> {
    if !paths.exist() {
        info!(
            index = %paths.index_file.display(),
            "No knowledge base found; build the index first"
        );
        return None;
    }

    match VectorStore::load(paths).await {
        Ok(store) => {
            info!(chunks = store.len(), dimension = store.dimension(), "Knowledge base loaded");
            Some(store)
        }
        Err(e) => {
            warn!(
                index = %paths.index_file.display(),
                error = %e,
                "Ignoring unusable knowledge base"
            );
            None
        }
    }
}

/// Incrementally builds a store, keeping both halves aligned.
///
/// The first vector fixes the dimensionality.
#[derive(Debug, Default)]
pub struct VectorStoreBuilder {
    index: Option<FlatL2Index>,
    documents: Vec<String>,
}

impl VectorStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one chunk. On error nothing is added to either side.
    pub fn push(&mut self, text: impl Into<String>, vector: &[f32]) -> Result<usize> {
        if vector.is_empty() {
            return Err(RagError::DimensionMismatch {
                expected: self.index.as_ref().map_or(0, FlatL2Index::dimension),
                actual: 0,
            });
        }
        if !vector.iter().all(|v| v.is_finite()) {
            return Err(RagError::NonFiniteVector);
        }
        let index = self
            .index
            .get_or_insert_with(|| FlatL2Index::new(vector.len()));
        let position = index.add(vector)?;
        self.documents.push(text.into());
        Ok(position)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Finish the store; `None` when nothing was added.
    pub fn finish(self) -> Option<VectorStore> {
        let index = self.index?;
        Some(VectorStore {
            index,
            documents: self.documents,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct IndexArtifact {
    version: u32,
    dimension: usize,
    count: usize,
    documents_digest: String,
    vectors: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct DocumentsArtifact {
    version: u32,
    count: usize,
    documents_digest: String,
    documents: Vec<String>,
}

/// SHA-256 over the length-prefixed texts, in order.
fn documents_digest(documents: &[String]) -> String {
    let mut hasher = Sha256::new();
    for doc in documents {
        hasher.update((doc.len() as u64).to_le_bytes());
        hasher.update(doc.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn tmp_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn corrupt(path: &Path, e: serde_json::Error) -> RagError {
    RagError::CorruptIndex {
        reason: format!("{}: {}", path.display(), e),
    }
}
