use scout_core::domain::Document;
use scout_core::error::AppError;

/// Where the run's documents come from. Any returned document is trusted input.
pub trait DocumentSource {
    fn fetch(&self, query: &str, count: usize) -> Result<Vec<Document>, AppError>;
}

pub mod arxiv;

pub use arxiv::ArxivSource;
