//! The shape of configuration the pipeline consumes.
//!
//! Loading these values from the environment (the `MYSQL_*`, `PINECONE_*`,
//! `OLLAMA_*` keys and friends) is the caller's job; this struct is only the
//! consumed shape, with the defaults the original system shipped with.

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k_results: usize,
    pub similarity_threshold: f32,
    pub embedding_dimension: usize,
    pub embedding_batch_size: usize,
    pub max_file_size_mb: u64,
    pub max_resume_text_length: usize,
    pub job_cache_max_size: usize,
    pub broad_mode_timeout_secs: u64,
    pub designation_match_top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k_results: 20,
            similarity_threshold: 0.3,
            embedding_dimension: 768,
            embedding_batch_size: 32,
            max_file_size_mb: 10,
            max_resume_text_length: 50_000,
            job_cache_max_size: 1000,
            broad_mode_timeout_secs: 10,
            designation_match_top_k: 50,
        }
    }
}

/// The file extensions the ingestion boundary accepts. Anything else is
/// rejected with `InputError::InvalidFileType`.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "doc", "txt", "jpg", "jpeg", "png", "html", "htm",
];

pub fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.embedding_dimension, 768);
        assert_eq!(cfg.broad_mode_timeout_secs, 10);
        assert_eq!(cfg.designation_match_top_k, 50);
    }

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(is_allowed_extension("PDF"));
        assert!(is_allowed_extension("docx"));
        assert!(!is_allowed_extension("exe"));
    }
}
