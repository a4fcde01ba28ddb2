use std::time::Duration;

use scout_core::domain::Document;
use scout_core::error::{codes, AppError};
use scout_core::ingest::arxiv_atom::parse_atom_feed;

use super::DocumentSource;

/// arXiv export API, newest submissions first.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    api_url: String,
    timeout: Duration,
}

impl ArxivSource {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_url: api_url.into(),
            timeout,
        }
    }
}

impl DocumentSource for ArxivSource {
    fn fetch(&self, query: &str, count: usize) -> Result<Vec<Document>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid_argument("Query must not be empty"));
        }
        if count == 0 {
            return Err(AppError::invalid_argument("Paper count must be positive"));
        }

        tracing::info!(query, count, "fetching papers from arXiv");
        let resp = ureq::get(&self.api_url)
            .timeout(self.timeout)
            .query("search_query", query)
            .query("sortBy", "submittedDate")
            .query("sortOrder", "descending")
            .query("max_results", &count.to_string())
            .call();

        let body = match resp {
            Ok(r) if r.status() == 200 => r.into_string().map_err(|e| {
                AppError::new(codes::SOURCE_UNAVAILABLE, "Failed to read arXiv response")
                    .with_details(e.to_string())
                    .with_retryable(true)
            })?,
            Ok(r) => {
                return Err(AppError::new(codes::SOURCE_UNAVAILABLE, "arXiv request failed")
                    .with_details(format!("status={}", r.status())))
            }
            Err(ureq::Error::Status(code, _)) => {
                return Err(AppError::new(codes::SOURCE_UNAVAILABLE, "arXiv request failed")
                    .with_details(format!("status={code}"))
                    .with_retryable(code >= 500))
            }
            Err(e) => {
                return Err(AppError::new(codes::SOURCE_UNAVAILABLE, "Failed to reach arXiv")
                    .with_details(e.to_string())
                    .with_retryable(true))
            }
        };

        let parsed = parse_atom_feed(&body)?;
        for w in &parsed.warnings {
            tracing::warn!(code = %w.code, details = w.details.as_deref().unwrap_or(""), "{}", w.message);
        }
        let mut documents = parsed.documents;
        documents.truncate(count);
        tracing::info!(documents = documents.len(), "arXiv feed parsed");
        Ok(documents)
    }
}
