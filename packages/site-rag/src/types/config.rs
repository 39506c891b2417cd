//! Configuration types for crawling, chunking and retrieval.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RagError, Result};

/// Configuration for a crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Starting URL (depth 0)
    pub seed_url: String,

    /// Maximum BFS depth to fetch (the seed is depth 0)
    pub max_depth: usize,

    /// Maximum number of page fetches. PDF downloads are not counted.
    pub max_pages: usize,

    /// Domain whose hosts may be enqueued.
    ///
    /// Defaults to the seed host without a leading `www.`; subdomains are
    /// accepted.
    pub domain: Option<String>,

    /// Substrings that exclude a link from traversal (logout endpoints,
    /// `javascript:` pseudo-links).
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Cleaned text must be longer than this many characters to be stored.
    pub min_content_chars: usize,
}

impl CrawlConfig {
    /// Create a new config for crawling from a seed URL.
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: 2,
            max_pages: 50,
            domain: None,
            exclude_patterns: vec!["logout".to_string(), "javascript".to_string()],
            min_content_chars: 100,
        }
    }

    /// Set the max depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the page budget.
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    /// Restrict traversal to an explicit domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Add an exclusion pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Set the minimum meaningful-content threshold.
    pub fn with_min_content_chars(mut self, chars: usize) -> Self {
        self.min_content_chars = chars;
        self
    }
}

/// Sliding-window chunking parameters (in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

impl ChunkConfig {
    /// Create a validated chunk config.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check `0 < chunk_size` and `overlap < chunk_size`.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be positive".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Distance between consecutive window starts.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Retrieval parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks joined into the context
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Locations of the two index artifacts.
///
/// The pair is always written and loaded together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    pub index_file: PathBuf,
    pub documents_file: PathBuf,
}

impl IndexPaths {
    /// Default artifact names inside a directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            index_file: dir.join("vector_store.json"),
            documents_file: dir.join("documents.json"),
        }
    }

    /// True when both artifacts exist on disk.
    pub fn exist(&self) -> bool {
        self.index_file.is_file() && self.documents_file.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_config_builder() {
        let config = CrawlConfig::new("https://example.edu")
            .with_max_depth(1)
            .with_max_pages(3)
            .with_domain("example.edu")
            .exclude("/admin");

        assert_eq!(config.max_depth, 1);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.domain.as_deref(), Some("example.edu"));
        assert!(config.exclude_patterns.contains(&"logout".to_string()));
        assert!(config.exclude_patterns.contains(&"/admin".to_string()));
    }

    #[test]
    fn test_chunk_config_rejects_overlap_not_smaller() {
        assert!(ChunkConfig::new(1000, 100).is_ok());
        assert!(ChunkConfig::new(100, 100).is_err());
        assert!(ChunkConfig::new(0, 0).is_err());
        assert_eq!(ChunkConfig::default().stride(), 900);
    }

    #[test]
    fn test_index_paths_in_dir() {
        let paths = IndexPaths::in_dir("/tmp/rag");
        assert_eq!(paths.index_file, PathBuf::from("/tmp/rag/vector_store.json"));
        assert_eq!(paths.documents_file, PathBuf::from("/tmp/rag/documents.json"));
    }
}
