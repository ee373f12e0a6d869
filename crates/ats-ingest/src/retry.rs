//! The single re-entry point for a resume parked in `failed:insufficient_text`.
//! Every other terminal failure is final; only thin-text extraction gets a
//! second attempt, and only by forcing OCR.

use ats_core::error::RepositoryError;
use ats_core::record::ResumeRecord;
use ats_core::status::{FailureReason, Status};
use ats_extract::fields::parse_module_selection;
use ats_extract::llm::LlmClient;
use ats_extract::text::ocr::OcrEngine;
use ats_extract::text::pdf::PdfRasterizer;
use ats_extract::text::{extract_text, TextExtractionContext};
use chrono::Utc;

use crate::orchestrator::run_selected_fields;
use crate::repository::{FileLocator, ResumeRepository};

/// Re-run a `failed:insufficient_text` record, forcing OCR over whatever
/// image or PDF rasterizer collaborators are supplied. Any other status is
/// returned unchanged rather than silently reprocessed.
pub async fn retry_insufficient_text(
    repo: &dyn ResumeRepository,
    files: &dyn FileLocator,
    llm: &dyn LlmClient,
    ocr: &dyn OcrEngine,
    pdf_rasterizer: Option<&dyn PdfRasterizer>,
    resume_id: i64,
    module_selection: &str,
) -> Result<ResumeRecord, RepositoryError> {
    let mut record = repo
        .find_by_id(resume_id)
        .await?
        .ok_or(RepositoryError::NotFound(resume_id))?;

    if record.status != Status::Failed(FailureReason::InsufficientText) {
        return Ok(record);
    }

    let bytes = match files.locate(&record.filename).await {
        Some(bytes) => bytes,
        None => return Ok(record),
    };

    record.status = Status::Processing;
    record.updated_at = Utc::now();
    record = repo.update(record).await?;

    let ctx = TextExtractionContext {
        ocr: Some(ocr),
        pdf_rasterizer,
        doc_converters: Vec::new(),
    };

    let resume_text = match extract_text(&bytes, &record.filename, &ctx) {
        Ok(text) => text,
        Err(_) => {
            record.status = Status::Failed(FailureReason::InsufficientText);
            record.updated_at = Utc::now();
            return repo.update(record).await;
        }
    };
    record.resume_text = Some(resume_text.clone());

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
    }

    #[async_trait]
    impl ResumeRepository for InMemoryRepo {
        async fn find_by_filename(&self, filename: &str) -> Result<Option<ResumeRecord>, RepositoryError> {
            Ok(self.records.lock().unwrap().iter().find(|r| r.filename == filename).cloned())
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<ResumeRecord>, RepositoryError> {
            Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }
        async fn create(&self, record: ResumeRecord) -> Result<ResumeRecord, RepositoryError> {
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

    struct StubFiles;

    #[async_trait]
    impl FileLocator for StubFiles {
        async fn locate(&self, _filename: &str) -> Option<Vec<u8>> {
            Some(b"a much longer scanned resume body recovered via forced ocr this time".to_vec())
        }
    }

    struct StubOcr;

    impl OcrEngine for StubOcr {
        fn recognize(&self, _image_bytes: &[u8], _psm: u32) -> Result<String, ats_core::error::ExtractionError> {
            Ok("a much longer scanned resume body recovered via forced ocr this time".to_string())
        }
    }

    struct StubLlm;

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn generate(&self, _req: &IsolatedRequest) -> Result<String, LlmError> {
            Ok("Jane Doe".to_string())
        }
        async fn health_check(&self) -> Result<Vec<String>, LlmError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn non_retryable_status_is_left_untouched() {
        let mut record = ResumeRecord::new_pending(1, "a.pdf", Utc::now());
        record.status = Status::Completed;
        let repo = InMemoryRepo { records: Mutex::new(vec![record]) };

        let result = retry_insufficient_text(&repo, &StubFiles, &StubLlm, &StubOcr, None, 1, "all")
            .await
            .unwrap();
        assert_eq!(result.status, Status::Completed);
    }

    #[tokio::test]
    async fn insufficient_text_record_recovers_to_completed() {
        let mut record = ResumeRecord::new_pending(1, "scan.jpg", Utc::now());
        record.status = Status::Failed(FailureReason::InsufficientText);
        let repo = InMemoryRepo { records: Mutex::new(vec![record]) };

        let result = retry_insufficient_text(&repo, &StubFiles, &StubLlm, &StubOcr, None, 1, "name")
            .await
            .unwrap();
        assert_eq!(result.status, Status::Completed);
        assert_eq!(result.candidate_name, Some("Jane Doe".to_string()));
    }
}
