use scout_core::domain::{Evidence, EvidenceSource};
use scout_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::guardrails::enforce_citations;
use crate::llm::Llm;

mod prompts;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BriefCitation {
    /// 1-based evidence number as cited in the brief.
    pub number: usize,
    pub chunk_id: String,
    pub source: EvidenceSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BriefDraft {
    pub markdown: String,
    /// Cited evidence, ascending by number.
    pub citations: Vec<BriefCitation>,
}

/// Draft a cited literature brief from ranked evidence.
pub fn draft_brief(
    llm: &dyn Llm,
    model: &str,
    query: &str,
    evidence: &[Evidence],
) -> Result<BriefDraft, AppError> {
    if query.trim().is_empty() {
        return Err(AppError::invalid_argument("Query must not be empty"));
    }
    if evidence.is_empty() {
        return Err(AppError::new(
            "AI_CITATION_REQUIRED",
            "At least one evidence item is required to draft a brief",
        ));
    }

    let prompt = prompts::brief_prompt(query.trim(), &build_evidence_blocks(evidence));
    tracing::info!(model, evidence = evidence.len(), prompt_bytes = prompt.len(), "drafting brief");
    let markdown = llm.generate(model, &prompt)?;

    let cited = enforce_citations(&markdown, evidence.len())?;
    let citations = cited
        .into_iter()
        .map(|number| {
            let e = &evidence[number - 1];
            BriefCitation {
                number,
                chunk_id: e.chunk_id.clone(),
                source: e.source.clone(),
            }
        })
        .collect();

    Ok(BriefDraft {
        markdown,
        citations,
    })
}

fn build_evidence_blocks(evidence: &[Evidence]) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(evidence.len());
    for (i, e) in evidence.iter().enumerate() {
        let authors = if e.source.authors.is_empty() {
            "unknown authors".to_string()
        } else {
            e.source.authors.join(", ")
        };
        blocks.push(format!(
            "[{}] {} | {} | published {} | {}\n{}",
            i + 1,
            e.source.title,
            authors,
            e.source.published,
            e.source.id,
            e.text
        ));
    }
    blocks.join("\n\n---\n\n")
}
