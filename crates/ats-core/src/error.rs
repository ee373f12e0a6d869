//! Error kinds shared across the pipeline.
//!
//! Each variant corresponds to one of the failure boundaries described for the
//! ingestion and search paths: boundary validation, text extraction, LLM-backed
//! classification/extraction, vector storage, query parsing, and repository
//! writes. Extractor- and classification-level errors are meant to be caught
//! and contained by their caller, never to unwind the whole pipeline.

use thiserror::Error;

/// Rejected at the ingestion boundary before any processing starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("file exceeds the configured maximum size")]
    FileTooLarge,
    #[error("file extension is not in the allow-list")]
    InvalidFileType,
    #[error("file is empty")]
    EmptyFile,
}

impl InputError {
    /// The `failed:<reason>` suffix this error maps to in the status machine.
    pub fn status_reason(&self) -> &'static str {
        match self {
            InputError::FileTooLarge => "file_too_large",
            InputError::InvalidFileType => "invalid_file_type",
            InputError::EmptyFile => "empty_file",
        }
    }
}

/// Bytes-to-text conversion failed, or produced too little text to be useful.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no handler recognizes this extension: {0}")]
    UnsupportedType(String),
    #[error("extraction yielded insufficient text ({found} chars, need {needed})")]
    InsufficientText { found: usize, needed: usize },
    #[error("underlying decoder failed: {0}")]
    DecoderFailure(String),
}

/// An LLM or parsing failure in the two-stage classifier. Non-fatal: the
/// field stays null and the pipeline continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("llm call failed: {0}")]
    LlmFailure(String),
    #[error("response did not parse to a known label")]
    UnparseableResponse,
}

/// One field extractor failed. Contained at the orchestrator; other
/// extractors and the final `completed` transition still proceed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldExtractorError {
    #[error("extractor '{extractor}' failed: {reason}")]
    Failed { extractor: String, reason: String },
    #[error("extractor '{0}' timed out")]
    Timeout(String),
}

/// Upsert or query against the vector store failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VectorError {
    #[error("index unreachable: {0}")]
    IndexUnreachable(String),
    #[error("namespace '{0}' does not exist")]
    UnknownNamespace(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// The query parser could not produce a trustworthy structure and fell back
/// to a defensible default. Surfaces to the search entry point.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryParseError {
    #[error("query text is empty")]
    EmptyQuery,
    #[error("parser fell back to default structure: {0}")]
    FellBackToDefault(String),
}

/// A database write failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("create failed: {0}")]
    CreateFailed(String),
    #[error("update failed: {0}")]
    UpdateFailed(String),
    #[error("record {0} not found")]
    NotFound(i64),
}

/// Umbrella error for code that must cross more than one boundary (the
/// ingestion orchestrator and the search engine entry points).
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    FieldExtractor(#[from] FieldExtractorError),
    #[error(transparent)]
    Vector(#[from] VectorError),
    #[error(transparent)]
    QueryParse(#[from] QueryParseError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
