//! Polymorphic bytes-to-text extraction. The extractor is a tagged variant
//! over file extension rather than a class hierarchy: `extract_text`
//! dispatches, each handler shares the capability `bytes -> text |
//! ExtractionError`, and OCR is a decorator wrapped around the PDF and image
//! handlers rather than a peer handler of its own.

pub mod doc;
pub mod docx;
pub mod html;
pub mod image;
pub mod ocr;
pub mod pdf;

use ats_core::error::ExtractionError;

use self::doc::DocConverter;
use self::ocr::OcrEngine;
use self::pdf::PdfRasterizer;

/// Below this many characters, extraction is considered to have failed
/// outright; the caller (the ingestion orchestrator) interprets this as
/// `insufficient_text`.
pub const MIN_USEFUL_CHARS: usize = 20;

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collaborators the text extractor may call out to. All optional: a bare
/// `TextExtractionContext::default()` still extracts text-layer PDFs, DOCX,
/// TXT, and tag-stripped HTML; it just can't OCR.
#[derive(Default)]
pub struct TextExtractionContext<'a> {
    pub ocr: Option<&'a dyn OcrEngine>,
    pub pdf_rasterizer: Option<&'a dyn PdfRasterizer>,
    pub doc_converters: Vec<&'a dyn DocConverter>,
}

fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// Extract normalized text from `bytes`, dispatching on `filename`'s
/// extension. Unknown extensions decode as UTF-8 with replacement rather
/// than failing outright.
pub fn extract_text(
    bytes: &[u8],
    filename: &str,
    ctx: &TextExtractionContext,
) -> Result<String, ExtractionError> {
    let ext = extension_of(filename);

    let raw = match ext.as_str() {
        "pdf" => pdf::extract_pdf(bytes, ctx.pdf_rasterizer, ctx.ocr)?,
        "docx" => docx::extract_docx(bytes, ctx.ocr)?,
        "doc" => doc::extract_doc(bytes, &ctx.doc_converters)?,
        "txt" => normalize_whitespace(&String::from_utf8_lossy(bytes)),
        "jpg" | "jpeg" | "png" | "bmp" | "tif" | "tiff" => image::extract_image(bytes, ctx.ocr)?,
        "html" | "htm" => html::extract_html(bytes, ctx.ocr)?,
        _ => normalize_whitespace(&String::from_utf8_lossy(bytes)),
    };

    let chars = raw.chars().count();
    if chars < MIN_USEFUL_CHARS {
        return Err(ExtractionError::InsufficientText {
            found: chars,
            needed: MIN_USEFUL_CHARS,
        });
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_dispatch_is_case_insensitive() {
        assert_eq!(extension_of("resume.PDF"), "pdf");
        assert_eq!(extension_of("resume.tar.gz"), "gz");
    }

    #[test]
    fn plain_text_round_trips_through_whitespace_normalization() {
        let ctx = TextExtractionContext::default();
        let text = extract_text(b"  hello   world  \n\n more text here today  ", "a.txt", &ctx).unwrap();
        assert_eq!(text, "hello world more text here today");
    }

    #[test]
    fn too_little_text_is_insufficient_text_error() {
        let ctx = TextExtractionContext::default();
        let err = extract_text(b"hi", "a.txt", &ctx).unwrap_err();
        assert!(matches!(err, ExtractionError::InsufficientText { .. }));
    }

    #[test]
    fn unknown_extension_decodes_lossily_rather_than_failing() {
        let ctx = TextExtractionContext::default();
        let text = extract_text(
            b"candidate resume content goes here for testing purposes today",
            "resume.xyz",
            &ctx,
        )
        .unwrap();
        assert!(text.contains("candidate resume"));
    }
}
