//! HTML extraction: excise forwarded-email preambles, DOM-extract the
//! interesting elements, fall back to crude tag stripping, and OCR any
//! inline base64 images.

use ats_core::error::ExtractionError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

use super::normalize_whitespace;
use super::ocr::{recognize_best, OcrEngine};

/// Markers that start a "forwarded from a mail client" preamble, which would
/// otherwise leak the recruiter's own contact block into the candidate's
/// extracted text.
const FORWARD_MARKERS: &[&str] = &["Personal Profile", "Name:"];

fn forward_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = FORWARD_MARKERS
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?m)^.*(?:{pattern}).*$")).unwrap()
    })
}

fn strip_forwarding_section(html: &str) -> String {
    forward_marker_re().replace_all(html, "").to_string()
}

fn base64_image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"data:image/[a-zA-Z]+;base64,([A-Za-z0-9+/=]+)"#).unwrap()
    })
}

fn contact_keyword_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| {
        Selector::parse(
            "[class*=contact], [id*=contact], [class*=profile], [id*=profile], \
             [class*=resume], [id*=resume], [class*=header], [id*=header]",
        )
        .unwrap()
    })
}

fn dom_extract(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();

    if let Some(title) = document
        .select(&Selector::parse("title").unwrap())
        .next()
    {
        parts.push(title.text().collect::<String>());
    }
    if let Some(header) = document.select(&Selector::parse("header").unwrap()).next() {
        parts.push(header.text().collect::<String>());
    }
    for pre in document.select(&Selector::parse("pre").unwrap()) {
        parts.push(pre.text().collect::<String>());
    }
    for el in document.select(contact_keyword_selector()) {
        parts.push(el.text().collect::<String>());
    }

    parts.join("\n")
}

fn strip_tags_crudely(html: &str) -> String {
    let tag_re = Regex::new(r"<[^>]*>").unwrap();
    tag_re.replace_all(html, " ").to_string()
}

fn ocr_inline_images(html: &str, ocr: Option<&dyn OcrEngine>) -> String {
    let Some(ocr) = ocr else { return String::new() };
    let mut out = String::new();
    for cap in base64_image_re().captures_iter(html) {
        if let Ok(bytes) = BASE64_STANDARD.decode(&cap[1]) {
            if let Some(text) = recognize_best(ocr, &bytes) {
                out.push_str(&text);
                out.push('\n');
            }
        }
    }
    out
}

const MIN_DOM_EXTRACT_CHARS: usize = 100;

pub fn extract_html(bytes: &[u8], ocr: Option<&dyn OcrEngine>) -> Result<String, ExtractionError> {
    let html = String::from_utf8_lossy(bytes).to_string();
    let without_forwarding = strip_forwarding_section(&html);

    let dom_text = normalize_whitespace(&dom_extract(&without_forwarding));
    let image_text = normalize_whitespace(&ocr_inline_images(&without_forwarding, ocr));

    let combined = if dom_text.chars().count() >= MIN_DOM_EXTRACT_CHARS {
        dom_text
    } else {
        let stripped = normalize_whitespace(&strip_tags_crudely(&without_forwarding));
        if stripped.len() > dom_text.len() {
            stripped
        } else {
            dom_text
        }
    };

    if image_text.is_empty() {
        Ok(combined)
    } else {
        Ok(format!("{combined}\n{image_text}"))
    }
}
