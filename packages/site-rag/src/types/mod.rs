//! Data types shared across the pipeline.

pub mod chunk;
pub mod config;
pub mod document;

pub use chunk::Chunk;
pub use config::{ChunkConfig, CrawlConfig, IndexPaths, RetrievalConfig};
pub use document::{DocumentKind, SourceId, StoredDocument};
