//! Mobile number extractor: header-dense regex first, then full-text regex,
//! then LLM, then a last-resort joint email+mobile prompt on a
//! symbol-stripped copy of the text.

use std::sync::OnceLock;

use ats_core::error::FieldExtractorError;
use ats_core::phone::normalize_phone;
use regex::Regex;

use crate::llm::{IsolatedRequest, LlmClient};

use super::truncate_for_prompt;

const HEADER_WINDOW: usize = 500;

/// Dense header formats with no separators, e.g. `(708)927-5276` or
/// `7089275276`, the kind recruiters paste right under their name with no
/// whitespace to anchor a looser pattern.
fn header_dense_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4}").unwrap())
}

fn full_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\+?1[\s.\-]?)?\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4}").unwrap()
    })
}

fn strip_symbols(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '@' || *c == '.')
        .collect()
}

pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    let header_end = resume_text.len().min(HEADER_WINDOW);
    if let Some(m) = header_dense_re().find(&resume_text[..header_end]) {
        if let Some(normalized) = normalize_phone(m.as_str()) {
            return Ok(Some(normalized));
        }
    }

    if let Some(m) = full_text_re().find(resume_text) {
        if let Some(normalized) = normalize_phone(m.as_str()) {
            return Ok(Some(normalized));
        }
    }

    if let Ok(raw) = llm
        .generate(&IsolatedRequest::new(
            "extractor-model",
            format!(
                "Extract the candidate's mobile/phone number. Respond with only the \
                 digits, nothing else.\n\n{}",
                truncate_for_prompt(resume_text)
            ),
        ))
        .await
    {
        if let Some(normalized) = normalize_phone(&raw) {
            return Ok(Some(normalized));
        }
    }

    let stripped = strip_symbols(resume_text);
    if let Ok(raw) = llm
        .generate(&IsolatedRequest::new(
            "extractor-model",
            format!(
                "From this text, extract the candidate's email and mobile number as \
                 JSON {{\"email\": ..., \"mobile\": ...}}.\n\n{}",
                truncate_for_prompt(&stripped)
            ),
        ))
        .await
    {
        if let Some(obj) = crate::json_recovery::recover_json_object(&raw) {
            if let Some(mobile) = obj.get("mobile").and_then(|v| v.as_str()) {
                if let Some(normalized) = normalize_phone(mobile) {
                    return Ok(Some(normalized));
                }
            }
        }
    }

    Ok(None)
}
