//! Raw text extraction from files.
//!
//! Every source variant satisfies the same total contract: given a path,
//! return the extracted text, or an empty string on any failure (missing
//! file, wrong format, decode failure, engine unavailable). Nothing in
//! this module raises.

use log::debug;
use std::collections::HashMap;
use std::path::Path;

mod ocr;
mod pdf;
mod text;

pub use ocr::{OcrSource, DEFAULT_LANGUAGE as DEFAULT_OCR_LANGUAGE};
pub use pdf::PdfSource;
pub use text::TextSource;

/// A file-to-text extractor. Implementations never fail: every failure
/// path degrades to an empty string.
pub trait SourceExtractor {
    fn extract(&self, path: &Path) -> String;
}

/// The three source variants the factory can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Pdf,
    Ocr,
}

/// Maps lowercased file extensions to source variants.
///
/// Unrecognized extensions fall back to the plain-text variant. Callers
/// may register additional extensions onto the existing variants.
#[derive(Debug, Clone)]
pub struct ExtractorFactory {
    registry: HashMap<String, SourceKind>,
    ocr_language: String,
}

impl Default for ExtractorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorFactory {
    pub fn new() -> Self {
        let mut registry = HashMap::new();
        for ext in ["txt", "text", "md"] {
            registry.insert(ext.to_string(), SourceKind::Text);
        }
        registry.insert("pdf".to_string(), SourceKind::Pdf);
        for ext in ["png", "jpg", "jpeg", "bmp", "tif", "tiff"] {
            registry.insert(ext.to_string(), SourceKind::Ocr);
        }
        Self {
            registry,
            ocr_language: ocr::DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Sets the language hint passed to the OCR engine.
    pub fn with_ocr_language(mut self, language: impl Into<String>) -> Self {
        self.ocr_language = language.into();
        self
    }

    /// Maps an additional extension onto one of the existing variants.
    pub fn register(&mut self, extension: &str, kind: SourceKind) {
        self.registry.insert(extension.to_lowercase(), kind);
    }

    /// Variant selected for a path, from its lowercased extension.
    pub fn kind_for(&self, path: &Path) -> SourceKind {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        self.registry.get(&ext).copied().unwrap_or(SourceKind::Text)
    }

    /// Builds the extractor for a path.
    pub fn for_path(&self, path: &Path) -> Box<dyn SourceExtractor> {
        let kind = self.kind_for(path);
        debug!("Selected {:?} source for {}", kind, path.display());
        match kind {
            SourceKind::Text => Box::new(TextSource::new()),
            SourceKind::Pdf => Box::new(PdfSource::new()),
            SourceKind::Ocr => Box::new(OcrSource::new(&self.ocr_language)),
        }
    }

    /// Extracts text from a file using the variant its extension selects.
    pub fn extract(&self, path: &Path) -> String {
        self.for_path(path).extract(path)
    }
}
