//! Persistence seams the orchestrator and search controller consume. The
//! database itself is external; these traits fix only the shapes and
//! transaction discipline (create/update/commit per operation, rollback on
//! failure) the rest of the pipeline relies on.

use async_trait::async_trait;

use ats_core::error::RepositoryError;
use ats_core::record::{ResumeRecord, SearchQueryRecord};

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn find_by_filename(&self, filename: &str) -> Result<Option<ResumeRecord>, RepositoryError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<ResumeRecord>, RepositoryError>;
    async fn create(&self, record: ResumeRecord) -> Result<ResumeRecord, RepositoryError>;
    async fn update(&self, record: ResumeRecord) -> Result<ResumeRecord, RepositoryError>;
}

/// Logs a recruiter query and, best-effort, a snapshot of its results. A
/// failure to persist results is logged by the caller and never fails the
/// search response itself.
#[async_trait]
pub trait SearchRepository: Send + Sync {
    async fn log_query(&self, query_text: &str, user_id: Option<i64>) -> Result<SearchQueryRecord, RepositoryError>;
    async fn save_results(&self, search_query_id: i64, results_json: serde_json::Value) -> Result<(), RepositoryError>;
}

/// Ordered on-disk search path the retry entry point uses to relocate a
/// resume's original bytes. The concrete storage (local disk, object store)
/// is external; this only fixes the contract.
#[async_trait]
pub trait FileLocator: Send + Sync {
    async fn locate(&self, filename: &str) -> Option<Vec<u8>>;
}
