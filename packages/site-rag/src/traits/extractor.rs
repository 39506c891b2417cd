//! Text extraction trait.

use std::path::Path;

/// Turns raw markup or a PDF file into cleaned plain text.
///
/// Both operations are best-effort: malformed input yields empty text
/// rather than an error.
pub trait TextExtractor: Send + Sync {
    /// Strip markup, scripts and page chrome, returning readable text.
    fn clean_markup(&self, raw_html: &str) -> String;

    /// Extract all text from a PDF on disk.
    fn extract_pdf_text(&self, path: &Path) -> String;
}
