//! PDF extraction: an embedded-text pass, promoted to an OCR pass over
//! rasterized pages when the text layer looks image-like.

use ats_core::error::ExtractionError;

use super::ocr::{recognize_best, OcrEngine};
use super::normalize_whitespace;

/// Rasterizing a PDF page to an image is delegated to an injected
/// collaborator rather than bundled here: the concrete renderer (a PDFium or
/// Poppler binding) is a platform-specific external dependency, the same way
/// the LLM runtime and vector DB client are.
pub trait PdfRasterizer: Send + Sync {
    /// Render every page to a preprocessed (denoised, deskewed,
    /// adaptive-thresholded) raster at `dpi`, ready for OCR.
    fn rasterize_pages(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError>;
}

/// Text is "image-like" when it's too sparse to be a genuine text layer:
/// fewer than 100 characters or fewer than 10 word tokens.
fn looks_image_like(text: &str) -> bool {
    text.chars().count() < 100 || text.split_whitespace().count() < 10
}

fn extract_embedded_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load_mem(pdf_bytes)
        .map_err(|e| ExtractionError::DecoderFailure(format!("lopdf: {e}")))?;

    let mut out = String::new();
    for (page_num, _) in doc.get_pages() {
        if let Ok(text) = doc.extract_text(&[page_num]) {
            out.push_str(&text);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Extract text from a PDF, falling back to OCR over rasterized pages when
/// the embedded text layer is too thin. Keeps whichever of the two (text
/// layer vs. OCR) is longer after normalization.
pub fn extract_pdf(
    pdf_bytes: &[u8],
    rasterizer: Option<&dyn PdfRasterizer>,
    ocr: Option<&dyn OcrEngine>,
) -> Result<String, ExtractionError> {
    let embedded = extract_embedded_text(pdf_bytes).unwrap_or_default();
    let embedded_norm = normalize_whitespace(&embedded);

    if !looks_image_like(&embedded_norm) {
        return Ok(embedded_norm);
    }

    let (Some(rasterizer), Some(ocr)) = (rasterizer, ocr) else {
        return Ok(embedded_norm);
    };

    let pages = rasterizer
        .rasterize_pages(pdf_bytes, super::ocr::MIN_OCR_DPI)
        .unwrap_or_default();

    let mut ocr_text = String::new();
    for page in &pages {
        if let Some(best) = recognize_best(ocr, page) {
            ocr_text.push_str(&best);
            ocr_text.push('\n');
        }
    }
    let ocr_norm = normalize_whitespace(&ocr_text);

    if ocr_norm.len() > embedded_norm.len() {
        Ok(ocr_norm)
    } else {
        Ok(embedded_norm)
    }
}
