//! Image OCR: rescale to at least 1200px on the short edge, grayscale,
//! threshold, then OCR under every page-segmentation mode, keeping the
//! longest result.

use ats_core::error::ExtractionError;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

use super::ocr::{recognize_best, OcrEngine};

const MIN_SHORT_EDGE: u32 = 1200;

/// Grayscale + a fixed-point adaptive-ish threshold. A true adaptive
/// threshold (per-window local mean) is straightforward to add once a real
/// OCR backend is wired in to tune against; this binarization is deliberately
/// simple and deterministic.
fn preprocess(img: &DynamicImage) -> DynamicImage {
    let (w, h) = img.dimensions();
    let short_edge = w.min(h).max(1);
    let scaled = if short_edge < MIN_SHORT_EDGE {
        let factor = MIN_SHORT_EDGE as f32 / short_edge as f32;
        img.resize(
            (w as f32 * factor) as u32,
            (h as f32 * factor) as u32,
            FilterType::Lanczos3,
        )
    } else {
        img.clone()
    };

    let gray = scaled.to_luma8();
    let mut thresholded = gray.clone();
    let mean: u32 = gray.pixels().map(|p| p.0[0] as u32).sum::<u32>() / gray.len().max(1) as u32;
    for pixel in thresholded.pixels_mut() {
        pixel.0[0] = if pixel.0[0] as u32 >= mean { 255 } else { 0 };
    }
    DynamicImage::ImageLuma8(thresholded)
}

pub fn extract_image(bytes: &[u8], ocr: Option<&dyn OcrEngine>) -> Result<String, ExtractionError> {
    let Some(ocr) = ocr else {
        return Err(ExtractionError::DecoderFailure(
            "no OCR engine configured".into(),
        ));
    };

    let img = image::load_from_memory(bytes)
        .map_err(|e| ExtractionError::DecoderFailure(format!("image decode: {e}")))?;

    let processed = preprocess(&img);
    let mut encoded = Vec::new();
    processed
        .write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::DecoderFailure(format!("re-encode: {e}")))?;

    recognize_best(ocr, &encoded)
        .ok_or_else(|| ExtractionError::InsufficientText { found: 0, needed: 1 })
}
