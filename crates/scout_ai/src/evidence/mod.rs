pub mod chunking;
pub mod index;
pub mod model;

pub use chunking::{ChunkSpan, Chunker};
pub use index::VectorIndex;
pub use model::{Candidate, Chunk, RankedCandidate};
