//! PDF source: embedded text extraction.

use super::SourceExtractor;
use log::{debug, warn};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSource;

impl PdfSource {
    pub fn new() -> Self {
        Self
    }
}

impl SourceExtractor for PdfSource {
    fn extract(&self, path: &Path) -> String {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Cannot read {}: {}", path.display(), err);
                return String::new();
            }
        };
        extract_pages(&bytes)
    }
}

/// Extracts embedded text per page, joined with a blank line. Encrypted,
/// scanned-only or corrupt documents degrade to "".
pub fn extract_pages(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem_by_pages(bytes) {
        Ok(pages) => {
            debug!("Extracted text from {} PDF pages", pages.len());
            pages
                .iter()
                .map(|page| page.trim())
                .filter(|page| !page.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        Err(err) => {
            warn!("PDF text extraction failed: {}", err);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pdf_degrades_to_empty() {
        assert_eq!(extract_pages(b"not a pdf at all"), "");
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        assert_eq!(PdfSource::new().extract(Path::new("/no/such.pdf")), "");
    }
}
