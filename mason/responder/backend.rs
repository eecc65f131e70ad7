use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generation request handed to a model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Fully assembled prompt text.
    pub prompt: String,
    /// Maximum number of output tokens.
    pub max_tokens: usize,
    /// Number of candidate completions; only the first is returned.
    pub num_candidates: usize,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
}

impl GenerateRequest {
    /// Creates a request with the assistant's generation defaults:
    /// 250 output tokens, a single candidate, low temperature.
    #[must_use]
    pub fn for_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 250,
            num_candidates: 1,
            temperature: 0.2,
            top_p: 0.9,
        }
    }
}

/// Errors surfaced by model backends.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport-level failure reaching the backend.
    #[error("transport error: {0}")]
    Transport(String),
    /// Backend answered with a non-success status.
    #[error("model endpoint returned status {0}")]
    Status(u16),
    /// Backend answered with a body the client could not decode.
    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// Abstraction over concrete generative backends (HTTP server, loopback).
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Generates a single completion for the request.
    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError>;
}

/// In-process backend for tests and offline sessions.
///
/// Returns either a fixed canned reply or a deterministic echo of the
/// prompt's final `User:` line.
#[derive(Debug, Clone, Default)]
pub struct LoopbackModelBackend {
    canned: Option<String>,
}

impl LoopbackModelBackend {
    /// Creates a loopback backend that always answers with `reply`.
    #[must_use]
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            canned: Some(reply.into()),
        }
    }
}

#[async_trait]
impl ModelBackend for LoopbackModelBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError> {
        if let Some(reply) = &self.canned {
            return Ok(reply.clone());
        }
        let question = request
            .prompt
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix("User: "))
            .unwrap_or("your question");
        Ok(format!(
            "Offline response: consult the relevant IS code for \"{question}\"."
        ))
    }
}
