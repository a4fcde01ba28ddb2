use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error codes shared by every layer of the pipeline.
pub mod codes {
    /// Text could not be tokenized or a token window could not be decoded.
    pub const ENCODING: &str = "CHUNK_ENCODING_FAILED";
    /// A publication date could not be parsed.
    pub const INVALID_DATE: &str = "RECENCY_INVALID_DATE";
    /// A vector whose norm is too small (or not finite) to normalize.
    pub const DEGENERATE_VECTOR: &str = "INDEX_DEGENERATE_VECTOR";
    pub const DIMENSION_MISMATCH: &str = "INDEX_DIMENSION_MISMATCH";
    pub const EMBEDDING: &str = "AI_EMBEDDINGS_FAILED";
    pub const SOURCE_UNAVAILABLE: &str = "SOURCE_UNAVAILABLE";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
    pub const BRIEF_WRITE_FAILED: &str = "BRIEF_WRITE_FAILED";
}

/// Single structured error shape used across the pipeline and returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_ARGUMENT, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Failures that only disqualify one document; the run continues without it.
    pub fn is_per_document(&self) -> bool {
        self.code == codes::ENCODING || self.code == codes::INVALID_DATE
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = self.details.as_deref() {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}
