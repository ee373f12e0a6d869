//! In-memory stand-ins for the collaborators the pipeline normally gets from
//! an LLM runtime, a database, and a file store. Good enough to drive the CLI
//! end to end against a single resume; none of these persist past one
//! process and none belong anywhere near production.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use ats_core::error::RepositoryError;
use ats_core::record::ResumeRecord;
use ats_extract::llm::{IsolatedRequest, LlmClient, LlmError};
use ats_ingest::repository::{FileLocator, ResumeRepository};

/// Always answers with the same canned line, regardless of the prompt. The
/// CLI picks the canned line per command so a demo run produces a plausible
/// looking field rather than a literal echo of the prompt text.
pub struct EchoLlm {
    pub canned_response: String,
}

impl EchoLlm {
    pub fn new(canned_response: impl Into<String>) -> Self {
        EchoLlm { canned_response: canned_response.into() }
    }
}

#[async_trait]
impl LlmClient for EchoLlm {
    async fn generate(&self, _req: &IsolatedRequest) -> Result<String, LlmError> {
        Ok(self.canned_response.clone())
    }

    async fn health_check(&self) -> Result<Vec<String>, LlmError> {
        Ok(vec!["echo-model".to_string()])
    }
}

#[derive(Default)]
pub struct InMemoryResumeRepository {
    records: Mutex<HashMap<i64, ResumeRecord>>,
    next_id: Mutex<i64>,
}

impl InMemoryResumeRepository {
    pub fn new() -> Self {
        InMemoryResumeRepository { records: Mutex::new(HashMap::new()), next_id: Mutex::new(1) }
    }
}

#[async_trait]
impl ResumeRepository for InMemoryResumeRepository {
    async fn find_by_filename(&self, filename: &str) -> Result<Option<ResumeRecord>, RepositoryError> {
        Ok(self.records.lock().unwrap().values().find(|r| r.filename == filename).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ResumeRecord>, RepositoryError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, mut record: ResumeRecord) -> Result<ResumeRecord, RepositoryError> {
        let mut next_id = self.next_id.lock().unwrap();
        record.id = *next_id;
        *next_id += 1;
        self.records.lock().unwrap().insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: ResumeRecord) -> Result<ResumeRecord, RepositoryError> {
        self.records.lock().unwrap().insert(record.id, record.clone());
        Ok(record)
    }
}

/// Resolves every filename to the same fixed bytes. Standing in for whatever
/// real storage (local disk, object store) the retry path would read from.
pub struct InMemoryFileLocator {
    pub bytes: Vec<u8>,
}

#[async_trait]
impl FileLocator for InMemoryFileLocator {
    async fn locate(&self, _filename: &str) -> Option<Vec<u8>> {
        Some(self.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_llm_returns_the_configured_canned_response() {
        let llm = EchoLlm::new("IT");
        let resp = llm.generate(&IsolatedRequest::new("model", "prompt")).await.unwrap();
        assert_eq!(resp, "IT");
    }

    #[tokio::test]
    async fn repository_create_assigns_sequential_ids() {
        use chrono::Utc;
        let repo = InMemoryResumeRepository::new();
        let a = repo.create(ResumeRecord::new_pending(0, "a.pdf", Utc::now())).await.unwrap();
        let b = repo.create(ResumeRecord::new_pending(0, "b.pdf", Utc::now())).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }
}
