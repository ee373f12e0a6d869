//! The ingestion orchestrator: boundary validation, idempotent-on-filename
//! record creation, text extraction, two-stage classification, the
//! sequential nine-extractor fleet (each wrapped in its own failure
//! boundary), and the final status transition.

use ats_core::config::{is_allowed_extension, PipelineConfig};
use ats_core::error::{InputError, RepositoryError};
use ats_core::record::ResumeRecord;
use ats_core::status::{FailureReason, Status};
use ats_extract::fields::{self, parse_module_selection};
use ats_extract::llm::LlmClient;
use ats_extract::text::{extract_text, TextExtractionContext};
use chrono::Utc;

use crate::repository::ResumeRepository;

fn extension_of(filename: &str) -> String {
    filename.rsplit('.').next().unwrap_or("").to_lowercase()
}

fn validate(file_bytes: &[u8], filename: &str, config: &PipelineConfig) -> Result<(), InputError> {
    let ext = extension_of(filename);
    if !is_allowed_extension(&ext) {
        return Err(InputError::InvalidFileType);
    }
    if file_bytes.is_empty() {
        return Err(InputError::EmptyFile);
    }
    let max_bytes = config.max_file_size_mb * 1024 * 1024;
    if file_bytes.len() as u64 > max_bytes {
        return Err(InputError::FileTooLarge);
    }
    Ok(())
}

fn commit_field(record: &mut ResumeRecord, extractor_name: &str, value: Option<String>) {
    match extractor_name {
        "name" => record.candidate_name = value,
        "designation" => record.designation = value,
        "role" => record.job_role = value,
        "email" => record.email = value,
        "mobile" => record.mobile = value,
        "domain" => record.domain = value,
        "education" => record.education = value,
        "experience" => record.experience = value,
        "skills" => record.skillset = value,
        _ => {}
    }
}

/// Run each selected extractor in fleet order and commit its value. Shared
/// between the main ingestion flow and the `insufficient_text` retry path.
pub(crate) async fn run_selected_fields(
    record: &mut ResumeRecord,
    llm: &dyn LlmClient,
    resume_text: &str,
    selected: &[&'static str],
) {
    for extractor_name in fields::FLEET_ORDER.iter().filter(|n| selected.contains(n)) {
        let value = run_extractor(extractor_name, llm, resume_text).await;
        commit_field(record, extractor_name, value);
    }
}

async fn run_extractor(extractor_name: &str, llm: &dyn LlmClient, resume_text: &str) -> Option<String> {
    let result = match extractor_name {
        "name" => fields::name::extract(llm, resume_text).await,
        "designation" => fields::designation::extract(llm, resume_text).await,
        "role" => fields::role::extract(llm, resume_text).await,
        "email" => fields::email::extract(llm, resume_text).await,
        "mobile" => fields::mobile::extract(llm, resume_text).await,
        "experience" => fields::experience::extract(llm, resume_text).await,
        "domain" => fields::domain::extract(llm, resume_text).await,
        "education" => fields::education::extract(llm, resume_text).await,
        "skills" => fields::skills::extract(llm, resume_text).await,
        _ => return None,
    };
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(extractor = extractor_name, error = %err, "field extractor failed, continuing fleet");
            None
        }
    }
}

/// Find the existing record for `filename`, or allocate a fresh pending one.
/// Reingestion of the same filename always reuses that record's id.
async fn find_or_create_pending(
    repo: &dyn ResumeRepository,
    filename: &str,
) -> Result<ResumeRecord, RepositoryError> {
    if let Some(existing) = repo.find_by_filename(filename).await? {
        return Ok(existing);
    }
    let pending = ResumeRecord::new_pending(0, filename, Utc::now());
    repo.create(pending).await
}

async fn fail_with(
    repo: &dyn ResumeRepository,
    mut record: ResumeRecord,
    reason: FailureReason,
) -> Result<ResumeRecord, RepositoryError> {
    record.status = Status::Failed(reason);
    record.updated_at = Utc::now();
    repo.update(record).await
}

/// Run the full ingestion sequence for one resume. Validation failures and
/// extraction failures both terminate with a specific `failed:<reason>`;
/// every other field extractor failure is contained and the fleet continues.
pub async fn ingest(
    repo: &dyn ResumeRepository,
    llm: &dyn LlmClient,
    config: &PipelineConfig,
    text_ctx: &TextExtractionContext<'_>,
    file_bytes: &[u8],
    filename: &str,
    module_selection: &str,
) -> Result<ResumeRecord, RepositoryError> {
    if let Err(input_err) = validate(file_bytes, filename, config) {
        let record = find_or_create_pending(repo, filename).await?;
        let reason = FailureReason::parse(input_err.status_reason()).unwrap_or(FailureReason::UnknownError);
        return fail_with(repo, record, reason).await;
    }

    let mut record = find_or_create_pending(repo, filename).await?;
    record.status = Status::Processing;
    record.updated_at = Utc::now();
    record = repo.update(record).await?;

    let resume_text = match extract_text(file_bytes, filename, text_ctx) {
        Ok(text) => text,
        Err(ats_core::error::ExtractionError::InsufficientText { .. }) => {
            return fail_with(repo, record, FailureReason::InsufficientText).await;
        }
        Err(_) => {
            return fail_with(repo, record, FailureReason::ExtractionError).await;
        }
    };
    record.resume_text = Some(resume_text.clone());

    let (mastercategory, category) = ats_classify::classify(llm, &resume_text).await;
    record.mastercategory = mastercategory;
    record.category = category;

    let selected = parse_module_selection(module_selection);
    run_selected_fields(&mut record, llm, &resume_text, &selected).await;

    record.status = Status::Completed;
    record.updated_at = Utc::now();
    repo.update(record).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ats_extract::llm::{IsolatedRequest, LlmError};
    use std::sync::Mutex;

    struct InMemoryRepo {
        records: Mutex<Vec<ResumeRecord>>,
        next_id: Mutex<i64>,
    }

    impl InMemoryRepo {
        fn new() -> Self {
            InMemoryRepo { records: Mutex::new(Vec::new()), next_id: Mutex::new(1) }
        }
    }

    #[async_trait]
    impl ResumeRepository for InMemoryRepo {
        async fn find_by_filename(&self, filename: &str) -> Result<Option<ResumeRecord>, RepositoryError> {
            Ok(self.records.lock().unwrap().iter().find(|r| r.filename == filename).cloned())
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<ResumeRecord>, RepositoryError> {
            Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }
        async fn create(&self, mut record: ResumeRecord) -> Result<ResumeRecord, RepositoryError> {
            let mut next_id = self.next_id.lock().unwrap();
            record.id = *next_id;
            *next_id += 1;
            self.records.lock().unwrap().push(record.clone());
            Ok(record)
        }
        async fn update(&self, record: ResumeRecord) -> Result<ResumeRecord, RepositoryError> {
            let mut records = self.records.lock().unwrap();
            if let Some(slot) = records.iter_mut().find(|r| r.id == record.id) {
                *slot = record.clone();
            }
            Ok(record)
        }
    }

    struct StubLlm;

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn generate(&self, _req: &IsolatedRequest) -> Result<String, LlmError> {
            Ok("IT".to_string())
        }
        async fn health_check(&self) -> Result<Vec<String>, LlmError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn invalid_extension_terminates_with_specific_reason() {
        let repo = InMemoryRepo::new();
        let config = PipelineConfig::default();
        let ctx = TextExtractionContext::default();
        let record = ingest(&repo, &StubLlm, &config, &ctx, b"some bytes", "resume.exe", "all").await.unwrap();
        assert_eq!(record.status, Status::Failed(FailureReason::InvalidFileType));
    }

    #[tokio::test]
    async fn empty_file_terminates_with_empty_file_reason() {
        let repo = InMemoryRepo::new();
        let config = PipelineConfig::default();
        let ctx = TextExtractionContext::default();
        let record = ingest(&repo, &StubLlm, &config, &ctx, b"", "resume.pdf", "all").await.unwrap();
        assert_eq!(record.status, Status::Failed(FailureReason::EmptyFile));
    }

    #[tokio::test]
    async fn thin_text_terminates_with_insufficient_text() {
        let repo = InMemoryRepo::new();
        let config = PipelineConfig::default();
        let ctx = TextExtractionContext::default();
        let record = ingest(&repo, &StubLlm, &config, &ctx, b"hi", "resume.txt", "all").await.unwrap();
        assert_eq!(record.status, Status::Failed(FailureReason::InsufficientText));
    }

    #[tokio::test]
    async fn reingesting_the_same_filename_reuses_the_id() {
        let repo = InMemoryRepo::new();
        let config = PipelineConfig::default();
        let ctx = TextExtractionContext::default();
        let bytes = b"candidate resume with plenty of content to pass the minimum useful text threshold easily";

        let first = ingest(&repo, &StubLlm, &config, &ctx, bytes, "dup.txt", "all").await.unwrap();
        let second = ingest(&repo, &StubLlm, &config, &ctx, bytes, "dup.txt", "all").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.records.lock().unwrap().len(), 1);
    }
}
