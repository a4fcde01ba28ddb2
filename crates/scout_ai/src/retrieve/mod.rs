//! Evidence assembly: segment → embed → index & search → rank → emit.
//!
//! One [`EvidenceAssembler::assemble`] call is one run. Stages are strictly
//! sequential; segmenting (chunking plus per-document recency) fans out over
//! rayon and is joined before the single batched embedding call. Per-document
//! failures become warnings; everything else ends the run.

use rayon::prelude::*;
use scout_core::config::ScoutConfig;
use scout_core::domain::{Document, Evidence, ValidationWarning};
use scout_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::embeddings::{check_batch, Embedder};
use crate::evidence::{Chunk, Chunker, VectorIndex};

pub mod rank;
pub mod recency;
pub mod similarity;

pub use rank::{rank, validate_k, FnScorer, RankScorer};
pub use recency::{decay_weight, RecencyScorer};

/// Request shape for exposing the pipeline over a process boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRequest {
    pub query: String,
    pub corpus: Vec<Document>,
    pub k: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStats {
    pub documents: usize,
    pub documents_used: usize,
    pub chunks: usize,
    pub indexed: usize,
    pub candidates: usize,
}

/// Successful run: ranked evidence plus the documents/vectors that were skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceRun {
    pub evidence: Vec<Evidence>,
    pub warnings: Vec<ValidationWarning>,
    pub stats: RunStats,
}

struct Segmented {
    decay: f64,
    chunks: Vec<Chunk>,
}

pub struct EvidenceAssembler<'a> {
    config: ScoutConfig,
    embedder: &'a dyn Embedder,
    chunker: Chunker,
    scorer: Box<dyn RankScorer + 'a>,
    today: Date,
}

impl<'a> EvidenceAssembler<'a> {
    /// Assembler scoring with the configured policy and today's UTC date.
    pub fn new(config: ScoutConfig, embedder: &'a dyn Embedder) -> Result<Self, AppError> {
        config.validate()?;
        let chunker = Chunker::new()?;
        Ok(Self {
            scorer: Box::new(config.scoring),
            config,
            embedder,
            chunker,
            today: OffsetDateTime::now_utc().date(),
        })
    }

    /// Pin the evaluation day used for recency.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = today;
        self
    }

    /// Replace the configured scoring policy.
    pub fn with_scorer(mut self, scorer: Box<dyn RankScorer + 'a>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn handle_request(&self, req: &EvidenceRequest) -> Result<EvidenceRun, AppError> {
        let k = validate_k(req.k)?;
        self.assemble(&req.query, &req.corpus, k)
    }

    /// Run the pipeline for one query over one batch of documents.
    pub fn assemble(
        &self,
        query: &str,
        documents: &[Document],
        k: usize,
    ) -> Result<EvidenceRun, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid_argument("Query must not be empty"));
        }
        if k == 0 {
            return Err(AppError::invalid_argument("k must be positive"));
        }
        let recency = RecencyScorer::new(self.today, self.config.half_life_weeks)?;

        let mut warnings: Vec<ValidationWarning> = Vec::new();
        let mut stats = RunStats {
            documents: documents.len(),
            ..RunStats::default()
        };

        // Segment.
        let (decays, chunks) = self.segment(documents, &recency, &mut warnings)?;
        stats.documents_used = decays.iter().filter(|d| d.is_some()).count();
        stats.chunks = chunks.len();
        tracing::info!(
            documents = stats.documents,
            used = stats.documents_used,
            chunks = stats.chunks,
            "segmented documents"
        );
        if chunks.is_empty() {
            tracing::info!("no chunks to search; returning empty evidence");
            return Ok(EvidenceRun {
                evidence: Vec::new(),
                warnings,
                stats,
            });
        }

        // Embed.
        let model = self.config.embed_model.as_str();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embed_exact(model, &texts)?;
        let query_vector = self
            .embed_exact(model, &[query.to_string()])?
            .pop()
            .ok_or_else(|| AppError::new(codes::EMBEDDING, "Query embedding missing"))?;
        tracing::info!(vectors = vectors.len(), model, "embedded chunks and query");

        // Index & search.
        let index = VectorIndex::build(&vectors)?;
        for &position in index.excluded() {
            let chunk = &chunks[position];
            tracing::warn!(chunk_id = %chunk.chunk_id, "excluding degenerate chunk vector");
            warnings.push(
                ValidationWarning::new(codes::DEGENERATE_VECTOR, "Chunk embedding has zero norm; excluded")
                    .with_details(format!(
                        "document_id={}; chunk_id={}",
                        documents[chunk.document].id, chunk.chunk_id
                    )),
            );
        }
        stats.indexed = index.len();

        let candidates = index.search(&query_vector, self.config.search_count(k))?;
        stats.candidates = candidates.len();

        let ranked = rank(
            &candidates,
            |c| decays[chunks[c.position].document].unwrap_or(f64::MIN_POSITIVE),
            self.scorer.as_ref(),
            k,
        )?;

        // Emit.
        let evidence: Vec<Evidence> = ranked
            .into_iter()
            .map(|r| {
                let chunk = &chunks[r.position];
                Evidence {
                    chunk_id: chunk.chunk_id.clone(),
                    ordinal: chunk.ordinal,
                    text: chunk.text.clone(),
                    similarity: r.similarity,
                    decay: r.decay,
                    score: r.score,
                    source: documents[chunk.document].source(),
                }
            })
            .collect();
        tracing::info!(
            evidence = evidence.len(),
            candidates = stats.candidates,
            warnings = warnings.len(),
            "ranked evidence"
        );

        Ok(EvidenceRun {
            evidence,
            warnings,
            stats,
        })
    }

    /// Chunk every document and compute its decay. Returns per-document decay
    /// (`None` for skipped documents) and the flat chunk list.
    fn segment(
        &self,
        documents: &[Document],
        recency: &RecencyScorer,
        warnings: &mut Vec<ValidationWarning>,
    ) -> Result<(Vec<Option<f64>>, Vec<Chunk>), AppError> {
        let chunker = &self.chunker;
        let max_tokens = self.config.max_chunk_tokens;

        let results: Vec<Result<Segmented, AppError>> = documents
            .par_iter()
            .enumerate()
            .map(|(i, doc)| {
                let decay = recency.decay(&doc.published)?;
                let mut chunks = chunker.chunk_document(i, &doc.id, &doc.abstract_text, max_tokens)?;
                // Windows holding only part of a character carry no text of their own.
                chunks.retain(|c| !c.text.trim().is_empty());
                Ok(Segmented { decay, chunks })
            })
            .collect();

        let mut decays = Vec::with_capacity(documents.len());
        let mut chunks = Vec::new();
        for (doc, result) in documents.iter().zip(results) {
            match result {
                Ok(seg) => {
                    if seg.chunks.is_empty() {
                        tracing::debug!(document_id = %doc.id, "document has no text; contributes no evidence");
                    }
                    decays.push(Some(seg.decay));
                    chunks.extend(seg.chunks);
                }
                Err(e) if e.is_per_document() => {
                    tracing::warn!(document_id = %doc.id, code = %e.code, "skipping document: {}", e.message);
                    let details = match e.details.as_deref() {
                        Some(d) if d.contains("document_id=") => d.to_string(),
                        Some(d) => format!("document_id={}; {d}", doc.id),
                        None => format!("document_id={}", doc.id),
                    };
                    warnings.push(ValidationWarning::from(e.with_details(details)));
                    decays.push(None);
                }
                Err(e) => return Err(e),
            }
        }
        Ok((decays, chunks))
    }

    /// Embed a batch, failing unless every input got a vector.
    fn embed_exact(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        let vectors = self.embedder.embed(model, texts).map_err(|e| {
            if e.code == codes::EMBEDDING {
                e
            } else {
                let details = format!("cause={e}");
                AppError::new(codes::EMBEDDING, "Failed to compute embeddings")
                    .with_details(details)
                    .with_retryable(e.retryable)
            }
        })?;
        check_batch(texts.len(), &vectors)?;
        Ok(vectors)
    }
}
