//! Industry domain extractor (e.g. healthcare, fintech, e-commerce).

use ats_core::error::FieldExtractorError;

use crate::llm::LlmClient;

use super::{parse_first_line, run_simple_extractor, ExtractorSpec};

pub(crate) fn spec() -> ExtractorSpec {
    ExtractorSpec {
        name: "domain",
        build_prompt: |text| {
            format!(
                "Extract the candidate's industry domain (e.g. healthcare, fintech, \
                 e-commerce). Respond with only the domain, nothing else.\n\n{text}"
            )
        },
        parse: parse_first_line,
    }
}

pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    run_simple_extractor(&spec(), llm, resume_text).await
}
