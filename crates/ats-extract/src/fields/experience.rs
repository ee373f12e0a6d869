//! Experience extractor: the richest of the nine. Five fallback stages run
//! in order — explicit summary statement, LLM (summary value or date
//! ranges), regex date ranges anchored on work context, fresher detection,
//! then a last regex fallback — and whichever stage succeeds wins. Results
//! are cached by a hash of the first 5k characters with a 24-hour TTL.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use ats_core::error::FieldExtractorError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::llm::{IsolatedRequest, LlmClient};

use super::truncate_for_prompt;

const CACHE_HASH_WINDOW: usize = 5000;
const CACHE_TTL_SECS: i64 = 24 * 60 * 60;

/// Lexical markers for "the role is still ongoing", far richer than just
/// "present" because recruiters and applicant-supplied text use all of
/// these interchangeably.
const PRESENT_SYNONYMS: &[&str] = &[
    "present", "till date", "to date", "current", "currently", "ongoing", "working", "now",
];

const WORK_CONTEXT_KEYWORDS: &[&str] = &[
    "experience", "work", "employment", "company", "engineer", "developer", "analyst",
    "manager", "consultant", "intern",
];

const EDUCATION_CONTEXT_KEYWORDS: &[&str] = &["university", "college", "degree", "bachelor", "master", "school"];

const FRESHER_MARKERS: &[&str] = &[
    "fresher",
    "no experience",
    "entry level",
    "recent graduate",
    "fresh graduate",
];

/// Round merged total months to the reported year count. Anything under 3
/// months rounds to 0; 3 to 11 months rounds up to "1 year" as a documented
/// override of the general `M/12 + carry` formula below; from 12 months on,
/// the general formula applies. Clamped to the plausible range.
pub fn months_to_years(months: u32) -> u32 {
    if months < 3 {
        0
    } else if months < 12 {
        1
    } else {
        let years = months / 12 + if months % 12 >= 6 { 1 } else { 0 };
        years.min(50)
    }
}

/// Merge overlapping or adjacent `[start, end]` date ranges (sorted by
/// start) and sum their total months.
pub fn merge_ranges_to_months(mut ranges: Vec<(NaiveDate, NaiveDate)>) -> u32 {
    if ranges.is_empty() {
        return 0;
    }
    ranges.sort_by_key(|r| r.0);

    let mut merged: Vec<(NaiveDate, NaiveDate)> = Vec::new();
    for (start, end) in ranges {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                if end > last.1 {
                    last.1 = end;
                }
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
        .iter()
        .map(|(start, end)| {
            let months = (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
            months.max(0) as u32
        })
        .sum()
}

fn explicit_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:over\s+)?(\d+)\s*(?:\+)?\s*(?:and\s+half\s+)?years?\s+(?:of\s+)?experience",
        )
        .unwrap()
    })
}

/// Stage 1: an explicit textual statement in the summary window. Integer
/// only; "X and half years" truncates the half away.
fn explicit_years_statement(summary_window: &str) -> Option<u32> {
    explicit_summary_re()
        .captures(summary_window)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

fn is_fresher(text: &str) -> bool {
    let lower = text.to_lowercase();
    FRESHER_MARKERS.iter().any(|m| lower.contains(m))
}

fn has_nearby_keyword(text: &str, pos: usize, keywords: &[&str], radius: usize) -> bool {
    let start = pos.saturating_sub(radius);
    let end = (pos + radius).min(text.len());
    let Some(window) = text.get(start..end) else {
        return false;
    };
    let lower = window.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

fn date_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(\d{1,2}/\d{4}|[A-Za-z]{3,9}\s+\d{4}|\d{4})\s*(?:-|to|–)\s*(\d{1,2}/\d{4}|[A-Za-z]{3,9}\s+\d{4}|\d{4}|present|current|now)",
        )
        .unwrap()
    })
}

fn parse_loose_date(raw: &str, now_year: i32, end_of_month: bool) -> Option<NaiveDate> {
    let lower = raw.trim().to_lowercase();
    if PRESENT_SYNONYMS.iter().any(|s| lower.contains(s)) {
        let now = Utc::now();
        return NaiveDate::from_ymd_opt(now.year(), now.month(), 1);
    }
    if let Some((m, y)) = lower.split_once('/') {
        let month: u32 = m.parse().ok()?;
        let year: i32 = y.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Ok(year) = lower.parse::<i32>() {
        let resolved = disambiguate_year(year, now_year);
        let month = if end_of_month { 12 } else { 1 };
        return NaiveDate::from_ymd_opt(resolved, month, 1);
    }
    // "Month YYYY"
    let parts: Vec<&str> = lower.split_whitespace().collect();
    if parts.len() == 2 {
        if let Ok(year) = parts[1].parse::<i32>() {
            let month = month_from_name(parts[0]).unwrap_or(1);
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
    }
    None
}

fn month_from_name(name: &str) -> Option<u32> {
    const NAMES: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let prefix = &name[..name.len().min(3)];
    NAMES.iter().position(|n| *n == prefix).map(|i| i as u32 + 1)
}

/// Two-digit years (from bare 4-digit parses this never fires; kept for
/// inputs like a plain `19` meaning 2019) are disambiguated against the
/// current year: anything at or before next year's last two digits is this
/// century, otherwise last century.
fn disambiguate_year(year: i32, now_year: i32) -> i32 {
    if year >= 100 {
        return year;
    }
    let pivot = (now_year + 1) % 100;
    if year <= pivot {
        2000 + year
    } else {
        1900 + year
    }
}

/// Stage 3: regex date-range extraction limited to contexts that look like
/// employment, rejecting education contexts.
fn regex_date_ranges(text: &str, now_year: i32) -> Vec<(NaiveDate, NaiveDate)> {
    let mut ranges = Vec::new();
    for cap in date_range_re().captures_iter(text) {
        let whole = cap.get(0).unwrap();
        if has_nearby_keyword(text, whole.start(), EDUCATION_CONTEXT_KEYWORDS, 80)
            && !has_nearby_keyword(text, whole.start(), WORK_CONTEXT_KEYWORDS, 80)
        {
            continue;
        }
        if !has_nearby_keyword(text, whole.start(), WORK_CONTEXT_KEYWORDS, 80) {
            continue;
        }
        let Some(start) = parse_loose_date(&cap[1], now_year, false) else { continue };
        let Some(end) = parse_loose_date(&cap[2], now_year, true) else { continue };
        if end >= start {
            ranges.push((start, end));
        }
    }
    ranges
}

fn cache() -> &'static Mutex<HashMap<u64, (String, DateTime<Utc>)>> {
    static CACHE: OnceLock<Mutex<HashMap<u64, (String, DateTime<Utc>)>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn hash_prefix(text: &str) -> u64 {
    let window = &text[..text.len().min(CACHE_HASH_WINDOW)];
    let digest = Sha256::digest(window.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn cache_lookup(key: u64, now: DateTime<Utc>) -> Option<String> {
    let guard = cache().lock().ok()?;
    let (value, at) = guard.get(&key)?;
    if (now - *at).num_seconds() < CACHE_TTL_SECS {
        Some(value.clone())
    } else {
        None
    }
}

fn cache_store(key: u64, value: String, now: DateTime<Utc>) {
    if let Ok(mut guard) = cache().lock() {
        guard.insert(key, (value, now));
    }
}

fn years_to_label(years: u32) -> String {
    if years == 1 {
        "1 year".to_string()
    } else {
        format!("{years} years")
    }
}

pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    let now = Utc::now();
    let key = hash_prefix(resume_text);
    if let Some(cached) = cache_lookup(key, now) {
        return Ok(Some(cached));
    }

    let summary_window = &resume_text[..resume_text.len().min(1500)];

    // Stage 1: explicit statement.
    if let Some(years) = explicit_years_statement(summary_window) {
        let label = years_to_label(years.min(50));
        cache_store(key, label.clone(), now);
        return Ok(Some(label));
    }

    // Stage 2: LLM extraction (summary value or date ranges).
    if let Ok(raw) = llm
        .generate(&IsolatedRequest::new(
            "extractor-model",
            format!(
                "Extract the candidate's total years of work experience as a single \
                 integer, or respond with JSON {{\"ranges\": [[\"start\", \"end\"], ...]}} \
                 of work-only date ranges if no summary value is stated. \"Present\", \
                 \"till date\", \"ongoing\" all mean the role continues today.\n\n{}",
                truncate_for_prompt(resume_text)
            ),
        ))
        .await
    {
        if let Ok(years) = raw.trim().parse::<u32>() {
            let label = years_to_label(years.min(50));
            cache_store(key, label.clone(), now);
            return Ok(Some(label));
        }
        if let Some(obj) = crate::json_recovery::recover_json_object(&raw) {
            if let Some(ranges_json) = obj.get("ranges").and_then(|v| v.as_array()) {
                let mut ranges = Vec::new();
                for pair in ranges_json {
                    let Some(arr) = pair.as_array() else { continue };
                    if arr.len() != 2 {
                        continue;
                    }
                    let start = arr[0].as_str().and_then(|s| parse_loose_date(s, now.year(), false));
                    let end = arr[1].as_str().and_then(|s| parse_loose_date(s, now.year(), true));
                    if let (Some(s), Some(e)) = (start, end) {
                        if e >= s {
                            ranges.push((s, e));
                        }
                    }
                }
                if !ranges.is_empty() {
                    let months = merge_ranges_to_months(ranges);
                    let label = years_to_label(months_to_years(months));
                    cache_store(key, label.clone(), now);
                    return Ok(Some(label));
                }
            }
        }
    }

    // Stage 3: regex date ranges anchored on work context.
    let ranges = regex_date_ranges(resume_text, now.year());
    if !ranges.is_empty() {
        let months = merge_ranges_to_months(ranges);
        let label = years_to_label(months_to_years(months));
        cache_store(key, label.clone(), now);
        return Ok(Some(label));
    }

    // Stage 4: fresher detection.
    if is_fresher(resume_text) {
        let label = "0 years".to_string();
        cache_store(key, label.clone(), now);
        return Ok(Some(label));
    }

    // Stage 5: regex fallback on the summary window alone, looser pattern.
    if let Some(m) = Regex::new(r"(\d+)\s*\+?\s*yrs?").unwrap().find(summary_window) {
        if let Ok(years) = m.as_str().chars().take_while(|c| c.is_ascii_digit()).collect::<String>().parse::<u32>() {
            let label = years_to_label(years.min(50));
            cache_store(key, label.clone(), now);
            return Ok(Some(label));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_rounding_examples() {
        assert_eq!(months_to_years(42), 4);
        assert_eq!(months_to_years(41), 3);
        assert_eq!(months_to_years(5), 1);
        assert_eq!(months_to_years(2), 0);
        assert_eq!(months_to_years(600), 50);
    }

    #[test]
    fn merges_overlapping_ranges() {
        let a = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let c = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let months = merge_ranges_to_months(vec![(a, b), (c, d)]);
        assert_eq!(months, 24);
    }

    #[test]
    fn explicit_statement_truncates_half_years() {
        assert_eq!(
            explicit_years_statement("I have 5 and half years of experience building systems"),
            Some(5)
        );
        assert_eq!(
            explicit_years_statement("over 8 years of experience"),
            Some(8)
        );
        assert_eq!(explicit_years_statement("9+ years of experience"), Some(9));
    }

    #[test]
    fn fresher_markers_are_detected() {
        assert!(is_fresher("Recent graduate looking for my first role"));
        assert!(!is_fresher("Senior engineer with a decade of work"));
    }

    #[test]
    fn two_digit_year_disambiguation_uses_a_century_pivot() {
        assert_eq!(disambiguate_year(19, 2026), 2019);
        assert_eq!(disambiguate_year(95, 2026), 1995);
    }
}
