use scout_core::error::{codes, AppError};

use super::model::Candidate;
use crate::retrieve::similarity::{normalized, unit_dot};

#[derive(Debug, Clone)]
struct IndexEntry {
    position: usize,
    unit: Vec<f32>,
}

/// Exact (flat) inner-product index over unit vectors.
///
/// Built fresh per run from the chunk vectors. Positions refer to the input slice
/// given to [`VectorIndex::build`]; degenerate inputs are left out and listed in
/// [`VectorIndex::excluded`].
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dims: Option<usize>,
    entries: Vec<IndexEntry>,
    excluded: Vec<usize>,
    input_len: usize,
}

impl VectorIndex {
    /// Normalize private copies of `vectors` and index them.
    ///
    /// Every vector must have the same dimension, degenerate ones included.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self, AppError> {
        let dims = vectors.first().map(Vec::len);
        if let Some(d) = dims {
            if let Some((position, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != d) {
                return Err(AppError::new(
                    codes::DIMENSION_MISMATCH,
                    "Embedding dimension mismatch across vectors",
                )
                .with_details(format!("expected={d}; got={}; position={position}", v.len())));
            }
        }

        let mut entries = Vec::with_capacity(vectors.len());
        let mut excluded = Vec::new();
        for (position, v) in vectors.iter().enumerate() {
            match normalized(v) {
                Some(unit) => entries.push(IndexEntry { position, unit }),
                None => excluded.push(position),
            }
        }

        Ok(Self {
            dims,
            entries,
            excluded,
            input_len: vectors.len(),
        })
    }

    /// Number of searchable vectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of vectors handed to `build`, searchable or not.
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn dims(&self) -> Option<usize> {
        self.dims
    }

    /// Input positions left out because their norm was too small or not finite.
    pub fn excluded(&self) -> &[usize] {
        &self.excluded
    }

    /// Stored unit vector for an input position.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        self.entries
            .binary_search_by_key(&position, |e| e.position)
            .ok()
            .map(|i| self.entries[i].unit.as_slice())
    }

    /// Top `k` entries by cosine similarity, descending; ties go to the lower position.
    ///
    /// An empty index returns no candidates whatever the query.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Candidate>, AppError> {
        if k == 0 {
            return Err(AppError::invalid_argument("search k must be positive"));
        }
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(d) = self.dims {
            if query.len() != d {
                return Err(AppError::new(
                    codes::DIMENSION_MISMATCH,
                    "Query embedding dims do not match index dims",
                )
                .with_details(format!("index_dims={d}; query_dims={}", query.len())));
            }
        }
        let q = normalized(query).ok_or_else(|| {
            AppError::new(codes::DEGENERATE_VECTOR, "Query embedding norm is zero")
        })?;

        let mut hits: Vec<Candidate> = self
            .entries
            .iter()
            .map(|e| Candidate {
                position: e.position,
                similarity: unit_dot(&q, &e.unit),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_returns_nothing() {
        let index = VectorIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dims(), None);
        assert!(index.search(&[1.0, 2.0], 5).unwrap().is_empty());
    }

    #[test]
    fn caller_vectors_are_not_mutated() {
        let raw = vec![vec![3.0f32, 4.0]];
        let index = VectorIndex::build(&raw).unwrap();
        assert_eq!(raw[0], vec![3.0, 4.0]);
        let stored = index.vector(0).unwrap();
        assert!((stored[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn vector_lookup_skips_excluded_positions() {
        let index = VectorIndex::build(&[vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 2.0]]).unwrap();
        assert!(index.vector(1).is_none());
        assert_eq!(index.vector(2).unwrap(), &[0.0, 1.0]);
        assert!(index.vector(9).is_none());
    }
}
