//! Fixed-size sliding-window chunking.
//!
//! Windows are measured in characters, never bytes, so a chunk boundary
//! cannot split a UTF-8 code point. Output order is left to right and is
//! the only record of intra-document order downstream.

use crate::error::Result;
use crate::types::{Chunk, ChunkConfig, SourceId, StoredDocument};

/// Splits text into overlapping windows.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkConfig::default(),
        }
    }
}

impl Chunker {
    /// Create a chunker, rejecting `overlap >= chunk_size`.
    pub fn new(config: ChunkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split `text` into windows of `chunk_size` characters, advancing by
    /// `chunk_size - overlap`. The last window may be shorter.
    pub fn chunk(&self, text: &str, source_id: &SourceId) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;
        let stride = self.config.stride();

        let mut chunks = Vec::with_capacity(char_len / stride + 1);
        let mut start = 0;
        while start < char_len {
            let end = (start + self.config.chunk_size).min(char_len);
            chunks.push(Chunk::new(
                &text[boundaries[start]..boundaries[end]],
                source_id.clone(),
            ));
            start += stride;
        }
        chunks
    }

    /// Chunk a batch of documents into one ordered sequence.
    pub fn chunk_documents(&self, documents: &[StoredDocument]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.chunk(&doc.text, &doc.source_id))
            .collect()
    }
}
