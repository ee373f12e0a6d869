//! Designation extractor: the candidate's most recent job title.

use ats_core::error::FieldExtractorError;

use crate::llm::LlmClient;

use super::{parse_first_line, run_simple_extractor, ExtractorSpec};

pub(crate) fn spec() -> ExtractorSpec {
    ExtractorSpec {
        name: "designation",
        build_prompt: |text| {
            format!(
                "Extract the candidate's most recent job title/designation from this resume. \
                 Respond with only the title, nothing else.\n\n{text}"
            )
        },
        parse: parse_first_line,
    }
}

pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    run_simple_extractor(&spec(), llm, resume_text).await
}
