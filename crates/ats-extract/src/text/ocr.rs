//! The OCR collaborator contract and the "try every page-segmentation mode,
//! keep the longest plausible result" policy that every caller applies
//! identically.

use ats_core::error::ExtractionError;

/// Page-segmentation modes tried, in order, against a rasterized page or
/// standalone image. Mirrors the common Tesseract PSM values used for dense
/// single-column resumes (6), sparse text (11), and a single block (3).
pub const PAGE_SEGMENTATION_MODES: [u32; 3] = [6, 11, 3];

/// Minimum DPI rasterized pages are rendered at before OCR.
pub const MIN_OCR_DPI: u32 = 300;

/// An OCR backend. The real implementation wraps a local engine (e.g.
/// Tesseract); this crate only needs the shape.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a single preprocessed image under one
    /// page-segmentation mode.
    fn recognize(&self, image_bytes: &[u8], psm: u32) -> Result<String, ExtractionError>;
}

/// Run every page-segmentation mode against one image and keep the longest
/// non-empty result. OCR engines disagree on segmentation in ways that are
/// hard to predict up front, so trying a small fixed set and keeping the
/// best is cheaper than trying to choose correctly.
pub fn recognize_best(engine: &dyn OcrEngine, image_bytes: &[u8]) -> Option<String> {
    PAGE_SEGMENTATION_MODES
        .iter()
        .filter_map(|&psm| engine.recognize(image_bytes, psm).ok())
        .max_by_key(|s| s.trim().len())
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
pub(crate) struct StubOcrEngine {
    pub by_psm: std::collections::HashMap<u32, String>,
}

#[cfg(test)]
impl OcrEngine for StubOcrEngine {
    fn recognize(&self, _image_bytes: &[u8], psm: u32) -> Result<String, ExtractionError> {
        self.by_psm
            .get(&psm)
            .cloned()
            .ok_or_else(|| ExtractionError::DecoderFailure("no stub for psm".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_longest_result_across_modes() {
        let engine = StubOcrEngine {
            by_psm: std::collections::HashMap::from([
                (6, "short".to_string()),
                (11, "a much longer recognized passage of text".to_string()),
                (3, "".to_string()),
            ]),
        };
        let best = recognize_best(&engine, b"fake").unwrap();
        assert_eq!(best, "a much longer recognized passage of text");
    }

    #[test]
    fn empty_when_every_mode_fails() {
        let engine = StubOcrEngine {
            by_psm: std::collections::HashMap::new(),
        };
        assert!(recognize_best(&engine, b"fake").is_none());
    }
}
