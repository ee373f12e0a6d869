//! Education extractor: the candidate's highest qualification.

use ats_core::error::FieldExtractorError;

use crate::llm::LlmClient;

use super::{parse_first_line, run_simple_extractor, ExtractorSpec};

pub(crate) fn spec() -> ExtractorSpec {
    ExtractorSpec {
        name: "education",
        build_prompt: |text| {
            format!(
                "Extract the candidate's highest education qualification (degree and \
                 field). Respond with only that, nothing else.\n\n{text}"
            )
        },
        parse: parse_first_line,
    }
}

pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    run_simple_extractor(&spec(), llm, resume_text).await
}
