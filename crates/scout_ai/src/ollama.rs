use std::time::Duration;

use scout_core::error::AppError;
use serde::Deserialize;

const HEALTH_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for Ollama. This is strictly limited to `127.0.0.1`.
    ///
    /// Accepted: `http://127.0.0.1` or `http://127.0.0.1:<port>` with port 1–65535,
    /// optionally with one trailing slash. No path, no userinfo, no other host.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let rejected = || {
            AppError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Ollama base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}"))
        };

        let rest = base_url.strip_prefix("http://127.0.0.1").ok_or_else(rejected)?;
        if !rest.is_empty() {
            let port = rest.strip_prefix(':').ok_or_else(rejected)?;
            if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
                return Err(rejected());
            }
            match port.parse::<u16>() {
                Ok(p) if p > 0 => {}
                _ => return Err(rejected()),
            }
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Reachability check against `/api/tags`; returns the installed model names.
    pub fn health_check(&self) -> Result<Vec<String>, AppError> {
        let url = self.endpoint("api/tags");
        let resp = ureq::get(&url).timeout(HEALTH_TIMEOUT).call();

        match resp {
            Ok(r) if r.status() == 200 => {
                let tags: TagsResponse = r.into_json().map_err(|e| {
                    AppError::new("AI_OLLAMA_UNHEALTHY", "Ollama returned an unreadable model list")
                        .with_details(e.to_string())
                })?;
                Ok(tags.models.into_iter().map(|m| m.name).collect())
            }
            Ok(r) => Err(
                AppError::new("AI_OLLAMA_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(code, _)) => Err(
                AppError::new("AI_OLLAMA_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={code}")),
            ),
            Err(e) => Err(AppError::new(
                "AI_OLLAMA_UNREACHABLE",
                "Failed to reach Ollama on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

/// Whether `model` is among `installed`; an untagged name matches `:latest`.
pub fn has_model(installed: &[String], model: &str) -> bool {
    installed.iter().any(|name| {
        name == model || (!model.contains(':') && name.strip_suffix(":latest") == Some(model))
    })
}
