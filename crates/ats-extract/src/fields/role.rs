//! Job role extractor: the candidate's primary function, distinct from
//! their literal title (e.g. "backend engineering" vs. "Senior SDE II").

use ats_core::error::FieldExtractorError;

use crate::llm::LlmClient;

use super::{parse_first_line, run_simple_extractor, ExtractorSpec};

pub(crate) fn spec() -> ExtractorSpec {
    ExtractorSpec {
        name: "role",
        build_prompt: |text| {
            format!(
                "Extract the candidate's primary job role/function in a few words. \
                 Respond with only the role, nothing else.\n\n{text}"
            )
        },
        parse: parse_first_line,
    }
}

pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    run_simple_extractor(&spec(), llm, resume_text).await
}
