//! Stored documents and their source identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// Maximum length of the sanitized path part of a source id.
const MAX_STEM_LEN: usize = 50;

/// Hex characters of the URL digest appended to a source id.
const HASH_SUFFIX_LEN: usize = 8;

/// Store-safe identifier derived deterministically from a URL.
///
/// The sanitized path alone collides for URLs that share a long prefix,
/// so a short digest of the full URL is appended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Derive the id for a URL: `<sanitized path>-<8 hex of sha256(url)>`.
    pub fn from_url(url: &Url) -> Self {
        let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
        Self(format!(
            "{}-{}",
            sanitized_stem(url),
            &digest[..HASH_SUFFIX_LEN]
        ))
    }

    /// Sanitized, truncated path with no disambiguating suffix.
    ///
    /// Collides for long shared prefixes; only for compatibility with
    /// stores written by older tooling.
    pub fn legacy(url: &Url) -> Self {
        Self(sanitized_stem(url))
    }

    /// Wrap an existing identifier (e.g. a file stem read from disk).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sanitized_stem(url: &Url) -> String {
    let mut stem: String = url
        .path()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() || stem == "_" {
        stem = "index".to_string();
    }
    // ASCII only at this point, so byte truncation is safe
    stem.truncate(MAX_STEM_LEN);
    stem
}

/// Kind of persisted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Cleaned text of a rendered page
    Page,
    /// Raw PDF binary
    Pdf,
}

impl DocumentKind {
    /// File extension used in the content store.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Page => "txt",
            DocumentKind::Pdf => "pdf",
        }
    }
}

/// A document loaded from the content store, ready for chunking.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub source_id: SourceId,
    pub kind: DocumentKind,
    pub text: String,
}

impl StoredDocument {
    pub fn new(source_id: SourceId, kind: DocumentKind, text: impl Into<String>) -> Self {
        Self {
            source_id,
            kind,
            text: text.into(),
        }
    }

    /// Check if this document has any text to index.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
