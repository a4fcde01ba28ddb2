use scout_core::error::{codes, AppError};

/// Batch text embedding.
///
/// Implementations return exactly one vector per input, in input order, or fail the
/// whole batch; a partially embedded batch would misalign the index.
pub trait Embedder {
    fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError>;
}

pub mod ollama_embed;

/// One non-empty vector per input, or `AI_EMBEDDINGS_FAILED`.
pub fn check_batch(inputs: usize, vectors: &[Vec<f32>]) -> Result<(), AppError> {
    if vectors.len() != inputs {
        return Err(AppError::new(codes::EMBEDDING, "Embeddings response length mismatch")
            .with_details(format!("inputs={inputs}; vectors={}", vectors.len())));
    }
    if let Some(i) = vectors.iter().position(Vec::is_empty) {
        return Err(AppError::new(codes::EMBEDDING, "Embeddings response contained an empty vector")
            .with_details(format!("index={i}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::check_batch;

    #[test]
    fn batch_must_align_with_inputs() {
        assert!(check_batch(2, &[vec![1.0], vec![2.0]]).is_ok());
        let err = check_batch(3, &[vec![1.0], vec![2.0]]).unwrap_err();
        assert_eq!(err.code, "AI_EMBEDDINGS_FAILED");
        let err = check_batch(2, &[vec![1.0], vec![]]).unwrap_err();
        assert_eq!(err.details.as_deref(), Some("index=1"));
    }
}
