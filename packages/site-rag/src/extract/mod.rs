//! Default text extraction for rendered markup and PDFs.
//!
//! - [`HtmlTextExtractor`] strips scripts, styles and page chrome with
//!   `scraper` and normalizes whitespace
//! - PDFs go through `pdf-extract`
//!
//! Both paths are best-effort and return empty text on bad input.

use scraper::{Html, Node};
use std::path::Path;
use tracing::{debug, warn};

use crate::traits::extractor::TextExtractor;

/// Elements whose text never reaches the knowledge base.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "header", "footer", "nav", "noscript", "svg",
];

/// `scraper`-based markup cleaner with PDF support.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTextExtractor;

impl HtmlTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for HtmlTextExtractor {
    fn clean_markup(&self, raw_html: &str) -> String {
        if raw_html.trim().is_empty() {
            return String::new();
        }

        let document = Html::parse_document(raw_html);
        let mut raw = String::new();
        let mut stack = vec![document.tree.root()];

        while let Some(node) = stack.pop() {
            match node.value() {
                Node::Text(text) => raw.push_str(text),
                Node::Element(el) if SKIPPED_TAGS.contains(&el.name()) => {}
                _ => stack.extend(node.children().rev()),
            }
        }

        normalize_whitespace(&raw)
    }

    fn extract_pdf_text(&self, path: &Path) -> String {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read PDF");
                return String::new();
            }
        };

        // pdf-extract panics on some malformed files
        let extracted =
            std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes));

        match extracted {
            Ok(Ok(text)) => {
                debug!(path = %path.display(), chars = text.len(), "PDF text extracted");
                text
            }
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "PDF extraction failed");
                String::new()
            }
            Err(_) => {
                warn!(path = %path.display(), "PDF extraction panicked");
                String::new()
            }
        }
    }
}

/// Trim every line, split on runs of two spaces, drop blank pieces and
/// join the remainder with newlines.
fn normalize_whitespace(raw: &str) -> String {
    raw.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
