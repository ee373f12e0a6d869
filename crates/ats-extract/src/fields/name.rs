//! Candidate name extractor.

use ats_core::error::FieldExtractorError;

use crate::llm::LlmClient;

use super::{run_simple_extractor, ExtractorSpec};

fn parse(raw: &str) -> Option<String> {
    let line = crate::json_recovery::first_nonempty_line(raw)?;
    let cleaned = line
        .trim_start_matches("Name:")
        .trim_start_matches("name:")
        .trim();
    if cleaned.is_empty() || cleaned.split_whitespace().count() > 5 {
        None
    } else {
        Some(cleaned.to_string())
    }
}

pub(crate) fn spec() -> ExtractorSpec {
    ExtractorSpec {
        name: "name",
        build_prompt: |text| {
            format!(
                "Extract the candidate's full name from the top of this resume. \
                 Respond with only the name, nothing else.\n\n{text}"
            )
        },
        parse,
    }
}

pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    run_simple_extractor(&spec(), llm, resume_text).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_a_leading_name_label() {
        assert_eq!(parse("Name: Ada Lovelace"), Some("Ada Lovelace".to_string()));
    }

    #[test]
    fn rejects_implausibly_long_lines() {
        assert_eq!(parse("this is clearly not a name at all, it rambles"), None);
    }
}
