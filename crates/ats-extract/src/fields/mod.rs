//! The nine-extractor field fleet. Each extractor is represented as a value
//! (a prompt builder + a parser), not a trait impl per field — the fleet is
//! a list to iterate, not a class hierarchy. Isolation between calls is the
//! caller's responsibility: every invocation builds a fresh
//! [`crate::llm::IsolatedRequest`], so there is no shared mutable context
//! between extractors or between resumes.

pub mod designation;
pub mod domain;
pub mod education;
pub mod email;
pub mod experience;
pub mod mobile;
pub mod name;
pub mod role;
pub mod skills;

use std::time::Duration;

use ats_core::error::FieldExtractorError;

use crate::json_recovery::first_nonempty_line;
use crate::llm::{IsolatedRequest, LlmClient};

/// Canonical fleet order. Positional module-selection indexes (1..9) in the
/// orchestrator's selection expression refer to this order.
pub const FLEET_ORDER: [&str; 9] = [
    "name",
    "designation",
    "role",
    "email",
    "mobile",
    "experience",
    "domain",
    "education",
    "skills",
];

/// A single-field LLM extractor with a constant prompt template and a
/// one-line parse rule. Used for the five extractors with no extra
/// regex/cache pipeline of their own (name, designation, role, domain,
/// education); email/mobile/experience/skills layer additional logic around
/// this same primitive.
pub struct ExtractorSpec {
    pub name: &'static str,
    pub build_prompt: fn(&str) -> String,
    pub parse: fn(&str) -> Option<String>,
}

pub(crate) async fn run_simple_extractor(
    spec: &ExtractorSpec,
    llm: &dyn LlmClient,
    resume_text: &str,
) -> Result<Option<String>, FieldExtractorError> {
    let prompt = (spec.build_prompt)(truncate_for_prompt(resume_text));
    let req = IsolatedRequest::new("extractor-model", prompt).with_timeout(Duration::from_secs(60));

    let raw = llm.generate(&req).await.map_err(|e| FieldExtractorError::Failed {
        extractor: spec.name.to_string(),
        reason: e.to_string(),
    })?;

    Ok((spec.parse)(&raw))
}

pub(crate) fn truncate_for_prompt(text: &str) -> &str {
    let max = 8000;
    if text.len() <= max {
        text
    } else {
        &text[..max]
    }
}

pub(crate) fn parse_first_line(raw: &str) -> Option<String> {
    first_nonempty_line(raw).filter(|s| !s.is_empty())
}

/// Run one of the generic single-line extractors by name.
pub async fn run_named_simple_extractor(
    extractor_name: &str,
    llm: &dyn LlmClient,
    resume_text: &str,
) -> Result<Option<String>, FieldExtractorError> {
    let spec = match extractor_name {
        "designation" => designation::spec(),
        "role" => role::spec(),
        "domain" => domain::spec(),
        "education" => education::spec(),
        other => {
            return Err(FieldExtractorError::Failed {
                extractor: other.to_string(),
                reason: "not a simple single-line extractor".to_string(),
            })
        }
    };
    run_simple_extractor(&spec, llm, resume_text).await
}

/// Parse a module-selection expression: `all`, `0`, or empty selects every
/// extractor; otherwise a comma-separated mix of names and 1-based
/// positional indexes. Unknown tokens are dropped (the caller logs a
/// warning, not this function).
pub fn parse_module_selection(expr: &str) -> Vec<&'static str> {
    let trimmed = expr.trim();
    if trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("all") {
        return FLEET_ORDER.to_vec();
    }

    let mut selected = Vec::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Ok(idx) = token.parse::<usize>() {
            if idx >= 1 && idx <= FLEET_ORDER.len() {
                selected.push(FLEET_ORDER[idx - 1]);
            }
        } else if let Some(&name) = FLEET_ORDER.iter().find(|n| n.eq_ignore_ascii_case(token)) {
            selected.push(name);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_all_and_zero_select_everything() {
        assert_eq!(parse_module_selection(""), FLEET_ORDER.to_vec());
        assert_eq!(parse_module_selection("all"), FLEET_ORDER.to_vec());
        assert_eq!(parse_module_selection("0"), FLEET_ORDER.to_vec());
    }

    #[test]
    fn mixes_names_and_positional_indexes() {
        assert_eq!(
            parse_module_selection("1,email,9"),
            vec!["name", "email", "skills"]
        );
    }

    #[test]
    fn unknown_tokens_are_dropped() {
        assert_eq!(parse_module_selection("name,bogus,99"), vec!["name"]);
    }
}
