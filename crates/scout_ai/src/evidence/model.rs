use serde::{Deserialize, Serialize};

/// A bounded slice of one document's abstract.
///
/// Chunks live in a flat list parallel to the run's document list; `document` is the
/// index of the owning document in that list, never an owning reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_id: String,
    pub document: usize,
    pub ordinal: u32,
    pub text: String,
    pub token_count: u32,
}

/// One search hit: a chunk position in the index input and its raw cosine similarity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub position: usize,
    pub similarity: f32,
}

/// A candidate after recency weighting and score blending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    pub position: usize,
    pub similarity: f32,
    pub decay: f64,
    pub score: f64,
}
