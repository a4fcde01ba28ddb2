use std::time::{Duration, Instant};

use scout_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::ollama::OllamaClient;

const BRIEF_FAILED: &str = "AI_BRIEF_FAILED";

/// Low temperature keeps briefs close to the evidence wording.
const BRIEF_TEMPERATURE: f32 = 0.2;

/// Ollama `/api/generate` in non-streaming mode.
#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    timeout: Duration,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: Option<bool>,
}

/// Generated text, or an error when the model stopped early or said nothing.
fn brief_text(resp: GenerateResponse) -> Result<String, AppError> {
    if resp.done == Some(false) {
        return Err(AppError::new(BRIEF_FAILED, "Model stopped before finishing the brief")
            .with_retryable(true));
    }
    let text = resp.response.trim();
    if text.is_empty() {
        return Err(AppError::new(BRIEF_FAILED, "Generated brief was empty"));
    }
    Ok(text.to_string())
}

impl Llm for OllamaLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let url = self.client.endpoint("api/generate");
        let body = serde_json::to_value(GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: BRIEF_TEMPERATURE,
            },
        })
        .map_err(|e| {
            AppError::new(BRIEF_FAILED, "Failed to encode generate request").with_details(e.to_string())
        })?;

        let started = Instant::now();
        let resp = match ureq::post(&url).timeout(self.timeout).send_json(body) {
            Ok(r) => r,
            Err(ureq::Error::Status(code, _)) => {
                return Err(AppError::new(BRIEF_FAILED, "Generate request failed")
                    .with_details(format!("status={code}; model={model}"))
                    .with_retryable(code >= 500));
            }
            Err(e) => {
                return Err(AppError::new(BRIEF_FAILED, "Failed to call generate endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true));
            }
        };

        let parsed: GenerateResponse = resp.into_json().map_err(|e| {
            AppError::new(BRIEF_FAILED, "Failed to decode generate response").with_details(e.to_string())
        })?;
        tracing::debug!(model, elapsed_ms = started.elapsed().as_millis() as u64, "generate returned");
        brief_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GenerateResponse {
        serde_json::from_str(json).expect("response json")
    }

    #[test]
    fn trims_generated_text() {
        let text = brief_text(response(r#"{"response":"\n## Takeaway [1]\n","done":true}"#)).unwrap();
        assert_eq!(text, "## Takeaway [1]");
    }

    #[test]
    fn empty_or_unfinished_output_is_an_error() {
        let err = brief_text(response(r#"{"response":"   ","done":true}"#)).unwrap_err();
        assert_eq!(err.code, "AI_BRIEF_FAILED");
        assert!(!err.retryable);

        let err = brief_text(response(r#"{"response":"partial [1]","done":false}"#)).unwrap_err();
        assert!(err.retryable);

        assert!(brief_text(response("{}")).is_err());
    }
}
