//! Skills extractor: an LLM pass followed by canonical-alias normalization
//! and order-preserving dedup.

use ats_core::alias::normalize_skill_list;
use ats_core::error::FieldExtractorError;

use crate::llm::{IsolatedRequest, LlmClient};

use super::truncate_for_prompt;

pub async fn extract(llm: &dyn LlmClient, resume_text: &str) -> Result<Option<String>, FieldExtractorError> {
    let raw = llm
        .generate(&IsolatedRequest::new(
            "extractor-model",
            format!(
                "List the candidate's technical skills as a comma-separated list, \
                 nothing else.\n\n{}",
                truncate_for_prompt(resume_text)
            ),
        ))
        .await
        .map_err(|e| FieldExtractorError::Failed {
            extractor: "skills".to_string(),
            reason: e.to_string(),
        })?;

    let raw_list: Vec<String> = raw
        .split([',', '\n'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if raw_list.is_empty() {
        return Ok(None);
    }

    let canonical = normalize_skill_list(&raw_list);
    Ok(Some(canonical.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_and_canonicalizes_aliases() {
        let raw = vec![
            "React.js".to_string(),
            "Python".to_string(),
            "reactjs".to_string(),
        ];
        let canonical = normalize_skill_list(&raw);
        assert_eq!(canonical, vec!["react", "python"]);
    }
}
