//! File-based content store.
//!
//! Layout under the root directory:
//! - `pdfs/<source_id>.pdf` - raw PDF binaries
//! - `html/<source_id>.txt` - cleaned page text with a `Source: <url>` header

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{RagError, Result};
use crate::traits::extractor::TextExtractor;
use crate::types::{DocumentKind, SourceId, StoredDocument};

const PDF_DIR: &str = "pdfs";
const HTML_DIR: &str = "html";

/// Persisted crawl output that seeds the index build.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open a store, creating both buckets if needed.
    ///
    /// Failure to create the directories is a fatal setup error.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        for dir in [store.pdf_dir(), store.html_dir()] {
            tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                RagError::Setup(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }
        Ok(store)
    }

    /// Open a store for reading without creating anything.
    ///
    /// Missing buckets simply load as empty.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.root.join(PDF_DIR)
    }

    pub fn html_dir(&self) -> PathBuf {
        self.root.join(HTML_DIR)
    }

    /// Path a document for `url` is stored at.
    pub fn path_for(&self, url: &Url, kind: DocumentKind) -> PathBuf {
        let dir = match kind {
            DocumentKind::Page => self.html_dir(),
            DocumentKind::Pdf => self.pdf_dir(),
        };
        dir.join(format!("{}.{}", SourceId::from_url(url), kind.extension()))
    }

    /// Persist cleaned page text under a `Source:` header line.
    pub async fn save_page(&self, url: &Url, text: &str) -> Result<PathBuf> {
        let path = self.path_for(url, DocumentKind::Page);
        tokio::fs::write(&path, format!("Source: {}\n\n{}", url, text)).await?;
        debug!(url = %url, path = %path.display(), "Saved page text");
        Ok(path)
    }

    /// Persist a PDF binary.
    pub async fn save_pdf(&self, url: &Url, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(url, DocumentKind::Pdf);
        tokio::fs::write(&path, bytes).await?;
        debug!(url = %url, path = %path.display(), bytes = bytes.len(), "Saved PDF");
        Ok(path)
    }

    /// Load every stored document: PDFs first, then pages, each bucket in
    /// file-name order.
    ///
    /// Unreadable or empty documents are skipped with a warning.
    pub async fn load_documents(&self, extractor: &dyn TextExtractor) -> Result<Vec<StoredDocument>> {
        let mut documents = Vec::new();

        for path in list_files(&self.pdf_dir(), DocumentKind::Pdf).await? {
            let text = extractor.extract_pdf_text(&path);
            push_document(&mut documents, &path, DocumentKind::Pdf, text);
        }

        for path in list_files(&self.html_dir(), DocumentKind::Page).await? {
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => push_document(&mut documents, &path, DocumentKind::Page, text),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to read page text"),
            }
        }

        info!(
            root = %self.root.display(),
            documents = documents.len(),
            "Loaded content store"
        );
        Ok(documents)
    }
}

fn push_document(documents: &mut Vec<StoredDocument>, path: &Path, kind: DocumentKind, text: String) {
    let source_id = SourceId::new(
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    let doc = StoredDocument::new(source_id, kind, text);
    if doc.has_content() {
        documents.push(doc);
    } else {
        warn!(path = %path.display(), "Skipping document with no text");
    }
}

/// Sorted files in `dir` with the bucket's extension. A missing directory
/// lists as empty.
async fn list_files(dir: &Path, kind: DocumentKind) -> Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(kind.extension()));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExtractor;

    #[tokio::test]
    async fn test_save_page_writes_source_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();
        let url = Url::parse("https://example.edu/about").unwrap();

        let path = store.save_page(&url, "About us").await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(path.starts_with(store.html_dir()));
        assert!(path.extension().is_some_and(|e| e == "txt"));
        assert_eq!(content, "Source: https://example.edu/about\n\nAbout us");
    }

    #[tokio::test]
    async fn test_load_orders_pdfs_before_pages() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();

        let page_b = Url::parse("https://example.edu/b").unwrap();
        let page_a = Url::parse("https://example.edu/a").unwrap();
        let pdf = Url::parse("https://example.edu/notes.pdf").unwrap();
        store.save_page(&page_b, "page b").await.unwrap();
        store.save_page(&page_a, "page a").await.unwrap();
        store.save_pdf(&pdf, b"%PDF-1.4").await.unwrap();

        let extractor = MockExtractor::new().with_pdf_text("pdf text");
        let docs = store.load_documents(&extractor).await.unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].kind, DocumentKind::Pdf);
        assert_eq!(docs[0].text, "pdf text");
        assert!(docs[1].text.ends_with("page a"));
        assert!(docs[2].text.ends_with("page b"));
    }

    #[tokio::test]
    async fn test_missing_buckets_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::at(dir.path().join("nothing-here"));
        let docs = store.load_documents(&MockExtractor::new()).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_empty_pdf_text_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();
        let pdf = Url::parse("https://example.edu/scan.pdf").unwrap();
        store.save_pdf(&pdf, b"%PDF-1.4").await.unwrap();

        let docs = store.load_documents(&MockExtractor::new()).await.unwrap();
        assert!(docs.is_empty());
    }
}
