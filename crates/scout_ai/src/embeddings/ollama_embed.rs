use std::time::{Duration, Instant};

use scout_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};

use super::{check_batch, Embedder};
use crate::ollama::OllamaClient;

/// Batch embeddings over Ollama `/api/embed`.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    timeout: Duration,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.client.endpoint("api/embed");
        let body = serde_json::to_value(EmbedRequest { model, input: inputs }).map_err(|e| {
            AppError::new(codes::EMBEDDING, "Failed to encode embeddings request")
                .with_details(e.to_string())
        })?;

        let started = Instant::now();
        let resp = match ureq::post(&url).timeout(self.timeout).send_json(body) {
            Ok(r) => r,
            Err(ureq::Error::Status(code, r)) => {
                let body = r.into_string().unwrap_or_default();
                return Err(AppError::new(codes::EMBEDDING, "Embeddings request failed")
                    .with_details(format!("status={code}; model={model}; body={}", body.trim()))
                    .with_retryable(code >= 500));
            }
            Err(e) => {
                return Err(AppError::new(codes::EMBEDDING, "Failed to call embeddings endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true));
            }
        };

        let parsed: EmbedResponse = resp.into_json().map_err(|e| {
            AppError::new(codes::EMBEDDING, "Failed to decode embeddings response")
                .with_details(e.to_string())
        })?;
        tracing::debug!(
            model,
            inputs = inputs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "embeddings returned"
        );
        check_batch(inputs.len(), &parsed.embeddings)?;
        Ok(parsed.embeddings)
    }
}
