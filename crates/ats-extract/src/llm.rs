//! The LLM collaborator contract.
//!
//! The runtime behind this trait (Ollama or anything compatible) is an
//! external system; this crate only needs the shape of the two request
//! modes it exercises and the isolation guarantee every caller must honor.
//! Implement this trait to wire in a real backend; tests use an in-memory
//! stub.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("endpoint not found")]
    NotFound,
}

/// Deterministic decoding knobs. Low temperature and small top-p are the
/// defaults every extractor prompt is sent with, so repeated calls on the
/// same input are stable enough to cache.
#[derive(Debug, Clone, Copy)]
pub struct DecodingOptions {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        DecodingOptions {
            temperature: 0.1,
            top_p: 0.3,
        }
    }
}

/// A single request, fully self-contained: no reference to any prior turn.
/// Constructing one of these *is* the isolation guarantee — there is no
/// handle to reuse a conversation.
#[derive(Debug, Clone)]
pub struct IsolatedRequest {
    pub model: String,
    pub system_preamble: String,
    pub prompt: String,
    pub options: DecodingOptions,
    pub timeout: Duration,
}

impl IsolatedRequest {
    /// Build a request carrying the "ignore prior context" system message
    /// every extractor call sends, regardless of what the model has seen
    /// before.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        IsolatedRequest {
            model: model.into(),
            system_preamble: "Ignore all prior context. Treat this as a fresh session.".to_string(),
            prompt: prompt.into(),
            options: DecodingOptions::default(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Backend contract. A `generate` call that 404s is retried transparently
/// against `chat` by the implementation, not by callers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, req: &IsolatedRequest) -> Result<String, LlmError>;

    async fn health_check(&self) -> Result<Vec<String>, LlmError>;
}

/// Extract the model's textual answer from a response payload that may use
/// any of the shapes the contract allows: `response`, `text`, `content`, or
/// `message.content`.
pub fn extract_response_text(payload: &serde_json::Value) -> Option<String> {
    for key in ["response", "text", "content"] {
        if let Some(s) = payload.get(key).and_then(|v| v.as_str()) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    payload
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
