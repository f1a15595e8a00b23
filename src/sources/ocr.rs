//! OCR source for scanned recipes.
//!
//! Images go through Tesseract with a fixed language hint when the `ocr`
//! feature is enabled. PDFs routed here fall back to embedded-text
//! extraction: recognizing a scanned PDF would require rasterizing its
//! pages first, and this build carries no PDF renderer, so a scanned-only
//! PDF degrades to "", which the source contract allows. With the feature
//! off the whole variant degrades the same way an unavailable engine
//! would.

use super::SourceExtractor;
use log::warn;
use std::path::Path;

/// Default Tesseract language hint.
pub const DEFAULT_LANGUAGE: &str = "spa+eng";

#[derive(Debug, Clone)]
pub struct OcrSource {
    language: String,
}

impl OcrSource {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Default for OcrSource {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl SourceExtractor for OcrSource {
    fn extract(&self, path: &Path) -> String {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        if is_pdf {
            return super::PdfSource::new().extract(path);
        }
        recognize_image(path, &self.language)
    }
}

/// Runs Tesseract over one image file, joining recognized blocks with a
/// blank line. All failures degrade to "".
#[cfg(feature = "ocr")]
fn recognize_image(path: &Path, language: &str) -> String {
    if !is_supported_image(path) {
        warn!("Unsupported image format: {}", path.display());
        return String::new();
    }

    let mut engine = match leptess::LepTess::new(None, language) {
        Ok(engine) => engine,
        Err(err) => {
            warn!("Tesseract init failed ({}): {}", language, err);
            return String::new();
        }
    };
    let Some(path_str) = path.to_str() else {
        return String::new();
    };
    if let Err(err) = engine.set_image(path_str) {
        warn!("Cannot load image {}: {}", path.display(), err);
        return String::new();
    }
    match engine.get_utf8_text() {
        Ok(text) => clean_blocks(&text),
        Err(err) => {
            warn!("OCR failed on {}: {}", path.display(), err);
            String::new()
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn recognize_image(path: &Path, _language: &str) -> String {
    warn!(
        "OCR engine unavailable (built without the ocr feature), skipping {}",
        path.display()
    );
    String::new()
}

/// Sniffs the first bytes; Tesseract handles PNG, JPEG, BMP and TIFF.
#[cfg(feature = "ocr")]
fn is_supported_image(path: &Path) -> bool {
    use std::io::Read;

    let Ok(mut file) = std::fs::File::open(path) else {
        return false;
    };
    let mut header = [0u8; 32];
    let Ok(read) = file.read(&mut header) else {
        return false;
    };
    if read < 8 {
        return false;
    }
    matches!(
        image::guess_format(&header[..read]),
        Ok(image::ImageFormat::Png
            | image::ImageFormat::Jpeg
            | image::ImageFormat::Bmp
            | image::ImageFormat::Tiff)
    )
}

/// Trims recognized text blocks and joins them with a blank line.
#[cfg(feature = "ocr")]
fn clean_blocks(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_degrades_to_empty() {
        let source = OcrSource::default();
        assert_eq!(source.extract(Path::new("/no/such/scan.png")), "");
    }

    #[test]
    fn test_pdf_falls_back_to_embedded_text() {
        // Not a real PDF either; the point is the path routes without panicking
        let source = OcrSource::default();
        assert_eq!(source.extract(Path::new("/no/such/scan.pdf")), "");
    }

    #[cfg(feature = "ocr")]
    #[test]
    fn test_non_image_bytes_rejected() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"definitely not a png").unwrap();
        assert_eq!(OcrSource::default().extract(file.path()), "");
    }
}
