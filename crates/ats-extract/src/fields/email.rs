//! Email extractor: a multi-window regex sweep that is authoritative, with
//! an additive (not authoritative) LLM pass layered on top.

use std::collections::HashSet;
use std::sync::OnceLock;

use ats_core::error::FieldExtractorError;
use regex::Regex;

use crate::llm::{IsolatedRequest, LlmClient};

use super::truncate_for_prompt;

const MAX_JOINED_LEN: usize = 255;
const HEADER_WINDOW: usize = 3000;
const FOOTER_WINDOW: usize = 1500;
const CONTEXT_RADIUS: usize = 60;

/// Domains belonging to job-board reply proxies rather than the candidate.
/// When every email found belongs to one of these, the field is a masked
/// placeholder, not a usable contact address.
const PROXY_DOMAINS: &[&str] = &[
    "indeedemail.com",
    "talent.indeed.com",
    "naukri.com",
    "monsteremail.com",
    "jobs-noreply.linkedin.com",
    "candidate.indeed.com",
];

pub const MASKED_EMAIL_SENTINEL: &str = "masked_email";

fn plain_email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap()
    })
}

fn mailto_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"mailto:([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})").unwrap())
}

fn bracketed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[<\[]([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})[>\]]").unwrap()
    })
}

fn labeled_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)e-?mail\s*[:\-]?\s*([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})").unwrap()
    })
}

fn candidate_domain_is_proxy(email: &str) -> bool {
    email
        .split('@')
        .nth(1)
        .map(|domain| PROXY_DOMAINS.iter().any(|p| domain.eq_ignore_ascii_case(p)))
        .unwrap_or(false)
}

fn collect_from_window(text: &str, found: &mut Vec<String>) {
    for re in [mailto_re(), bracketed_re(), labeled_re()] {
        for cap in re.captures_iter(text) {
            found.push(cap[1].to_string());
        }
    }
    for m in plain_email_re().find_iter(text) {
        found.push(m.as_str().to_string());
    }
}

fn context_windows_around_at(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut windows = Vec::new();
    for (i, _) in text.match_indices('@') {
        let start = i.saturating_sub(CONTEXT_RADIUS);
        let end = (i + CONTEXT_RADIUS).min(bytes.len());
        if let Ok(slice) = std::str::from_utf8(&bytes[start..end]) {
            windows.push(slice.to_string());
        }
    }
    windows
}

/// Regex-only pass across the whole text, the header window, the footer
/// window, and per-`@` context windows.
fn regex_pass(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_from_window(text, &mut found);

    let header_end = text.len().min(HEADER_WINDOW);
    collect_from_window(&text[..header_end], &mut found);

    let footer_start = text.len().saturating_sub(FOOTER_WINDOW);
    collect_from_window(&text[footer_start..], &mut found);

    for window in context_windows_around_at(text) {
        collect_from_window(&window, &mut found);
    }

    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|e| e.trim_end_matches(['.', ',', ')', ']']).to_string())
        .filter(|e| seen.insert(e.to_lowercase()))
        .collect()
}

fn join_and_truncate(emails: &[String]) -> String {
    let joined = emails.join(",");
    if joined.len() <= MAX_JOINED_LEN {
        joined
    } else {
        joined[..MAX_JOINED_LEN].to_string()
    }
}

/// Extract every email address. The LLM pass is additive: it can only add
/// candidates the regex sweep missed, never override what regex found.
pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    let mut emails = regex_pass(resume_text);

    if let Ok(raw) = llm
        .generate(&IsolatedRequest::new(
            "extractor-model",
            format!(
                "List every email address mentioned in this resume text, one per line, \
                 nothing else.\n\n{}",
                truncate_for_prompt(resume_text)
            ),
        ))
        .await
    {
        let mut seen: HashSet<String> = emails.iter().map(|e| e.to_lowercase()).collect();
        for candidate in plain_email_re().find_iter(&raw) {
            let email = candidate.as_str().to_string();
            if seen.insert(email.to_lowercase()) {
                emails.push(email);
            }
        }
    }

    if emails.is_empty() {
        return Ok(None);
    }

    if emails.iter().all(|e| candidate_domain_is_proxy(e)) {
        return Ok(Some(MASKED_EMAIL_SENTINEL.to_string()));
    }

    Ok(Some(join_and_truncate(&emails)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_pass_finds_plain_mailto_and_bracketed_forms() {
        let text = "Contact: mailto:jane@example.com or <john@example.org> or jane.doe@test.co";
        let found = regex_pass(text);
        assert!(found.iter().any(|e| e == "jane@example.com"));
        assert!(found.iter().any(|e| e == "john@example.org"));
        assert!(found.iter().any(|e| e == "jane.doe@test.co"));
    }

    #[test]
    fn dedupes_case_insensitively() {
        let text = "Jane@Example.com and jane@example.com";
        assert_eq!(regex_pass(text).len(), 1);
    }

    #[test]
    fn proxy_domain_detection() {
        assert!(candidate_domain_is_proxy("abc123@talent.indeed.com"));
        assert!(!candidate_domain_is_proxy("jane@gmail.com"));
    }

    #[test]
    fn truncates_to_255_chars() {
        let many: Vec<String> = (0..50).map(|i| format!("user{i}@example.com")).collect();
        let joined = join_and_truncate(&many);
        assert!(joined.len() <= MAX_JOINED_LEN);
    }
}
