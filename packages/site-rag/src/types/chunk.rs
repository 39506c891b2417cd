//! Chunk type.

use serde::{Deserialize, Serialize};

use crate::types::document::SourceId;

/// A bounded slice of a document's text, the unit of embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_id: SourceId,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source_id: SourceId) -> Self {
        Self {
            text: text.into(),
            source_id,
        }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
