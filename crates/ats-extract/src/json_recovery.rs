//! Defensive recovery of a JSON object from LLM output that may be wrapped
//! in code fences, prefixed with commentary, or just slightly malformed.
//!
//! The strategy, in order: strip fences, locate the first `{` and do a
//! greedy balanced-brace match to find its close, try `serde_json` on that
//! slice, and if that fails fall back to a small set of regex-based
//! recoveries for the common "trailing comma" and "unquoted key" failures.
//! Callers are expected to apply sentinel defaults if even that fails.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        return rest.trim().strip_suffix("```").unwrap_or(rest).trim();
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        return rest.trim().strip_suffix("```").unwrap_or(rest).trim();
    }
    trimmed
}

/// Find the span of the first balanced `{ ... }` object in `text`, honoring
/// string literals so that braces inside quoted values don't confuse the
/// depth count.
fn find_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        let c = b as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([}\]])").unwrap())
}

/// Attempt to parse an LLM response into a JSON object, trying progressively
/// more forgiving strategies. Returns `None` only if nothing recoverable was
/// found; callers should apply their own sentinel defaults at that point.
pub fn recover_json_object(raw: &str) -> Option<Value> {
    let stripped = strip_code_fences(raw);

    if let Ok(v) = serde_json::from_str::<Value>(stripped) {
        if v.is_object() {
            return Some(v);
        }
    }

    let candidate = find_balanced_object(stripped)?;
    if let Ok(v) = serde_json::from_str::<Value>(candidate) {
        if v.is_object() {
            return Some(v);
        }
    }

    let repaired = trailing_comma_re().replace_all(candidate, "$1");
    serde_json::from_str::<Value>(&repaired)
        .ok()
        .filter(Value::is_object)
}

/// First non-empty line of text after stripping code fences and surrounding
/// quotes — the parsing rule the classifier uses for its single-token
/// responses.
pub fn first_nonempty_line(raw: &str) -> Option<String> {
    let stripped = strip_code_fences(raw);
    stripped
        .lines()
        .map(|l| l.trim().trim_matches('"').trim_matches('\''))
        .find(|l| !l.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let v = recover_json_object(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(v["name"], "Ada");
    }

    #[test]
    fn strips_code_fences() {
        let v = recover_json_object("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn recovers_object_from_surrounding_commentary() {
        let v = recover_json_object("Sure, here you go: {\"a\": {\"b\": 1}} -- done.").unwrap();
        assert_eq!(v["a"]["b"], 1);
    }

    #[test]
    fn recovers_from_trailing_comma() {
        let v = recover_json_object(r#"{"a": 1, "b": [1, 2,], }"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn returns_none_for_hopeless_input() {
        assert!(recover_json_object("no json here at all").is_none());
    }

    #[test]
    fn first_line_strips_fences_and_quotes() {
        assert_eq!(
            first_nonempty_line("```\n\"IT\"\n```"),
            Some("IT".to_string())
        );
    }
}
