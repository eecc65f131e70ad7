use std::{fmt, sync::Arc};

use crate::backend::{GenerateRequest, ModelBackend, ModelError};

/// Fixed apology shown to users when the generative backend fails.
pub const APOLOGY: &str =
    "Sorry, something went wrong while generating an answer. Please try again.";

/// Reply produced by the responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    /// User-visible reply text.
    pub text: String,
    /// True when the backend failed and the apology was substituted.
    pub recovered: bool,
}

/// Failure-absorbing facade over a model backend.
///
/// Backend errors never escape: they are converted into the fixed apology
/// so a model outage degrades to a textual message instead of tearing down
/// the session.
#[derive(Clone)]
pub struct ModelResponder {
    backend: Arc<dyn ModelBackend>,
}

impl fmt::Debug for ModelResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelResponder").finish_non_exhaustive()
    }
}

impl ModelResponder {
    /// Creates a responder over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Generates one completion for the prompt, substituting the apology
    /// on any backend failure.
    pub async fn respond(&self, prompt: &str) -> ModelReply {
        match self.try_respond(prompt).await {
            Ok(text) => ModelReply {
                text,
                recovered: false,
            },
            Err(_) => ModelReply {
                text: APOLOGY.to_string(),
                recovered: true,
            },
        }
    }

    /// Generates one completion, propagating backend errors. Exposed for
    /// callers that want to inspect the failure before degrading.
    pub async fn try_respond(&self, prompt: &str) -> Result<String, ModelError> {
        self.backend.generate(GenerateRequest::for_prompt(prompt)).await
    }
}
