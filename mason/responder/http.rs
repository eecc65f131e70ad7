use std::{env, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::backend::{GenerateRequest, ModelBackend, ModelError};

/// Environment variable naming the generation endpoint.
pub const ENDPOINT_ENV: &str = "MASON_MODEL_ENDPOINT";
/// Environment variable carrying an `x-api-key` header value.
pub const API_KEY_ENV: &str = "MASON_MODEL_API_KEY";
/// Environment variable carrying a bearer token.
pub const JWT_ENV: &str = "MASON_MODEL_JWT";

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9000/generate";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    prompt: &'a str,
    max_tokens: usize,
    num_candidates: usize,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    text: String,
}

/// Backend that POSTs generation requests to a JSON `/generate` endpoint.
#[derive(Debug, Clone)]
pub struct HttpModelBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    jwt: Option<String>,
}

impl HttpModelBackend {
    /// Creates a backend for an explicit endpoint. Auth material is still
    /// read from the environment.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ModelError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: env::var(API_KEY_ENV).ok(),
            jwt: env::var(JWT_ENV).ok(),
        })
    }

    /// Creates a backend from `MASON_MODEL_ENDPOINT`, falling back to the
    /// local default server address.
    pub fn from_env() -> Result<Self, ModelError> {
        let endpoint = env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        Self::new(endpoint)
    }

    /// The endpoint this backend targets.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelBackend for HttpModelBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError> {
        let payload = WireRequest {
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            num_candidates: request.num_candidates,
            temperature: request.temperature,
            top_p: request.top_p,
        };
        let mut req = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }
        if let Some(token) = &self.jwt {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .map_err(|err| ModelError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Status(status.as_u16()));
        }
        let body: WireResponse = response
            .json()
            .await
            .map_err(|err| ModelError::Malformed(err.to_string()))?;
        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_endpoint_is_kept() {
        let backend = HttpModelBackend::new("http://10.0.0.5:9000/generate").unwrap();
        assert_eq!(backend.endpoint(), "http://10.0.0.5:9000/generate");
    }

    #[test]
    fn wire_request_serializes_generation_fields() {
        let request = GenerateRequest::for_prompt("ping");
        let payload = WireRequest {
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            num_candidates: request.num_candidates,
            temperature: request.temperature,
            top_p: request.top_p,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["prompt"], "ping");
        assert_eq!(json["max_tokens"], 250);
        assert_eq!(json["num_candidates"], 1);
    }
}
