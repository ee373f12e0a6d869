//! Two sequential LLM calls over the first ~1000 characters of resume text:
//! mastercategory (`IT`/`NON_IT`), then a category constrained to that
//! mastercategory's closed label set. Both are non-fatal — on failure the
//! field stays `None` and the caller keeps going.

pub mod categories;

use ats_core::error::ClassificationError;
use ats_core::record::Mastercategory;
use ats_extract::json_recovery::first_nonempty_line;
use ats_extract::llm::{IsolatedRequest, LlmClient};

const CLASSIFIER_WINDOW: usize = 1000;

fn window(text: &str) -> &str {
    &text[..text.len().min(CLASSIFIER_WINDOW)]
}

fn parse_mastercategory(raw: &str) -> Option<Mastercategory> {
    let line = first_nonempty_line(raw)?;
    Mastercategory::parse(&line)
}

/// Stage 1: IT vs NON_IT.
pub async fn classify_mastercategory(
    llm: &dyn LlmClient,
    resume_text: &str,
) -> Result<Option<Mastercategory>, ClassificationError> {
    let prompt = format!(
        "Classify this resume as exactly one of: IT, NON_IT. Respond with only the \
         label, no explanation.\n\n{}",
        window(resume_text)
    );
    let raw = llm
        .generate(&IsolatedRequest::new("classifier-model", prompt))
        .await
        .map_err(|e| ClassificationError::LlmFailure(e.to_string()))?;

    Ok(parse_mastercategory(&raw))
}

/// Stage 2: a category from the closed list for the given mastercategory.
pub async fn classify_category(
    llm: &dyn LlmClient,
    resume_text: &str,
    mastercategory: Mastercategory,
) -> Result<Option<String>, ClassificationError> {
    let options = categories::categories_for(mastercategory).join(", ");
    let prompt = format!(
        "Classify this resume into exactly one of these categories: {options}. \
         Respond with only the category label, no explanation.\n\n{}",
        window(resume_text)
    );
    let raw = llm
        .generate(&IsolatedRequest::new("classifier-model", prompt))
        .await
        .map_err(|e| ClassificationError::LlmFailure(e.to_string()))?;

    let line = first_nonempty_line(&raw).ok_or(ClassificationError::UnparseableResponse)?;
    Ok(categories::resolve_category(mastercategory, &line).map(|s| s.to_string()))
}

/// Run both stages. A stage-1 failure or a non-`Some` result skips stage 2
/// entirely, leaving both fields `None` — the caller continues the pipeline
/// regardless.
pub async fn classify(
    llm: &dyn LlmClient,
    resume_text: &str,
) -> (Option<Mastercategory>, Option<String>) {
    let mastercategory = match classify_mastercategory(llm, resume_text).await {
        Ok(Some(m)) => m,
        _ => return (None, None),
    };

    let category = classify_category(llm, resume_text, mastercategory)
        .await
        .ok()
        .flatten();

    (Some(mastercategory), category)
}

pub mod prelude {
    pub use crate::categories::{categories_for, resolve_category, IT_CATEGORIES, NON_IT_CATEGORIES};
    pub use crate::{classify, classify_category, classify_mastercategory};
}
