use serde::{Deserialize, Serialize};

/// A fetched paper. Immutable once produced by a document source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Source-system key (for arXiv, the abs URL).
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    /// Abstract text; the only field that is chunked.
    #[serde(rename = "abstract", alias = "summary")]
    pub abstract_text: String,
    /// ISO-8601 date or timestamp as provided by the source. Parsed lazily so a bad
    /// value only disqualifies this document.
    pub published: String,
}

impl Document {
    pub fn source(&self) -> EvidenceSource {
        EvidenceSource {
            id: self.id.clone(),
            title: self.title.clone(),
            authors: self.authors.clone(),
            published: self.published.clone(),
        }
    }
}

/// Enough of a [`Document`] to cite it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceSource {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub published: String,
}

/// One ranked snippet, the output unit of the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    /// Content-derived id of the chunk this text came from.
    pub chunk_id: String,
    /// Position of the chunk within its document.
    pub ordinal: u32,
    pub text: String,
    /// Raw cosine similarity to the query, in [-1, 1].
    pub similarity: f32,
    /// Recency weight in (0, 1].
    pub decay: f64,
    /// Combined rank score.
    pub score: f64,
    pub source: EvidenceSource,
}

/// A recoverable problem reported next to a successful result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<crate::error::AppError> for ValidationWarning {
    fn from(err: crate::error::AppError) -> Self {
        Self {
            code: err.code,
            message: err.message,
            details: err.details,
        }
    }
}
