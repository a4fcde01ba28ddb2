use std::sync::Arc;

use scout_core::error::{codes, AppError};
use scout_core::normalize::collapse_whitespace;
use sha2::{Digest, Sha256};
use tiktoken_rs::{CoreBPE, Rank};

use super::model::Chunk;

/// One token window and its decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    pub text: String,
    pub tokens: Vec<Rank>,
}

/// Token-budget text splitter over tiktoken's `o200k_base` encoding.
///
/// Cheap to clone; the BPE tables are shared.
#[derive(Clone)]
pub struct Chunker {
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for Chunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunker").field("encoding", &"o200k_base").finish()
    }
}

impl Chunker {
    pub fn new() -> Result<Self, AppError> {
        let bpe = tiktoken_rs::o200k_base().map_err(|e| {
            AppError::new(codes::ENCODING, "Failed to load tokenizer").with_details(e.to_string())
        })?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    /// Tokens of the whitespace-normalized text.
    pub fn tokenize(&self, text: &str) -> Vec<Rank> {
        self.bpe.encode_ordinary(&collapse_whitespace(text))
    }

    pub fn token_count(&self, text: &str) -> usize {
        self.tokenize(text).len()
    }

    /// Split into consecutive, non-overlapping windows of at most `max_tokens` tokens.
    ///
    /// Empty (or whitespace-only) text yields no spans. Window boundaries are purely
    /// token-based, so a window may end inside a multi-byte character; the incomplete
    /// bytes are carried into the next window's text. Span texts therefore always
    /// concatenate back to the normalized input, and a window made only of a partial
    /// character has empty text.
    pub fn split(&self, text: &str, max_tokens: usize) -> Result<Vec<ChunkSpan>, AppError> {
        if max_tokens == 0 {
            return Err(AppError::invalid_argument("max_tokens must be positive"));
        }
        let tokens = self.tokenize(text);
        let mut spans = Vec::with_capacity(tokens.len().div_ceil(max_tokens));
        let mut carry: Vec<u8> = Vec::new();
        let last = tokens.len().div_ceil(max_tokens).saturating_sub(1);
        for (i, window) in tokens.chunks(max_tokens).enumerate() {
            carry.extend(self.bpe._decode_native_and_split(window.to_vec()).flatten());
            let text = take_complete_utf8(&mut carry, i == last).map_err(|valid_up_to| {
                AppError::new(codes::ENCODING, "Token window is not valid UTF-8")
                    .with_details(format!("window={i}; tokens={}; valid_up_to={valid_up_to}", window.len()))
            })?;
            spans.push(ChunkSpan {
                text,
                tokens: window.to_vec(),
            });
        }
        Ok(spans)
    }

    /// Text-only form of [`Chunker::split`].
    pub fn chunk(&self, text: &str, max_tokens: usize) -> Result<Vec<String>, AppError> {
        Ok(self
            .split(text, max_tokens)?
            .into_iter()
            .map(|span| span.text)
            .collect())
    }

    /// Chunks for the document at `document` in the run's document list.
    pub fn chunk_document(
        &self,
        document: usize,
        document_id: &str,
        text: &str,
        max_tokens: usize,
    ) -> Result<Vec<Chunk>, AppError> {
        let spans = self.split(text, max_tokens).map_err(|e| {
            let details = match e.details.as_deref() {
                Some(d) => format!("document_id={document_id}; {d}"),
                None => format!("document_id={document_id}"),
            };
            e.with_details(details)
        })?;
        Ok(spans
            .into_iter()
            .enumerate()
            .map(|(ordinal, span)| {
                let ordinal = ordinal.min(u32::MAX as usize) as u32;
                Chunk {
                    chunk_id: chunk_id(document_id, ordinal, &span.text),
                    document,
                    ordinal,
                    token_count: span.tokens.len().min(u32::MAX as usize) as u32,
                    text: span.text,
                }
            })
            .collect())
    }
}

/// Drain the longest complete UTF-8 prefix of `buf`, leaving a trailing partial
/// character behind unless `flush` is set. Errs with the valid prefix length on bytes
/// that can never become valid.
fn take_complete_utf8(buf: &mut Vec<u8>, flush: bool) -> Result<String, usize> {
    let complete = match std::str::from_utf8(buf) {
        Ok(_) => buf.len(),
        Err(e) if e.error_len().is_none() && !flush => e.valid_up_to(),
        Err(e) => return Err(e.valid_up_to()),
    };
    let rest = buf.split_off(complete);
    let bytes = std::mem::replace(buf, rest);
    String::from_utf8(bytes).map_err(|e| e.utf8_error().valid_up_to())
}

/// Content-derived chunk id: stable across runs for the same document text.
pub fn chunk_id(document_id: &str, ordinal: u32, text: &str) -> String {
    let payload = format!("document={document_id}\nordinal={ordinal}\ntext={text}");
    hex::encode(Sha256::digest(payload.as_bytes()))
}
