use std::cell::RefCell;

use pretty_assertions::assert_eq;
use scout_ai::draft::draft_brief;
use scout_ai::llm::Llm;
use scout_core::domain::{Evidence, EvidenceSource};
use scout_core::error::AppError;

struct MockLlm {
    out: String,
    prompts: RefCell<Vec<String>>,
}

impl MockLlm {
    fn new(out: &str) -> Self {
        Self {
            out: out.to_string(),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl Llm for MockLlm {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, AppError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.out.clone())
    }
}

fn evidence(n: usize) -> Vec<Evidence> {
    (1..=n)
        .map(|i| Evidence {
            chunk_id: format!("chunk-{i}"),
            ordinal: 0,
            text: format!("Finding number {i} about datacenter energy."),
            similarity: 0.9,
            decay: 1.0,
            score: 0.9,
            source: EvidenceSource {
                id: format!("http://arxiv.org/abs/2505.0000{i}v1"),
                title: format!("Paper {i}"),
                authors: vec!["Ada Lovelace".to_string()],
                published: "2025-05-01T00:00:00Z".to_string(),
            },
        })
        .collect()
}

#[test]
fn brief_without_citations_is_rejected() {
    let llm = MockLlm::new("Energy use is rising.");
    let err = draft_brief(&llm, "mock", "LLM energy use", &evidence(2)).expect_err("should error");
    assert_eq!(err.code, "AI_CITATION_REQUIRED");
}

#[test]
fn brief_citing_missing_evidence_is_rejected() {
    let llm = MockLlm::new("Energy use is rising [1][3].");
    let err = draft_brief(&llm, "mock", "LLM energy use", &evidence(2)).expect_err("should error");
    assert_eq!(err.code, "AI_CITATION_INVALID");
    assert_eq!(err.details.as_deref(), Some("cited=3; evidence_count=2"));
}

#[test]
fn cited_numbers_map_back_to_evidence() {
    let llm = MockLlm::new("## Takeaway\nRising [2].\n\n- Cooling dominates [1, 2]\n");
    let draft = draft_brief(&llm, "mock", "LLM energy use", &evidence(3)).expect("draft");
    let numbers: Vec<usize> = draft.citations.iter().map(|c| c.number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(draft.citations[1].chunk_id, "chunk-2");
    assert_eq!(draft.citations[1].source.title, "Paper 2");
    assert!(draft.markdown.starts_with("## Takeaway"));
}

#[test]
fn prompt_numbers_every_evidence_block() {
    let llm = MockLlm::new("Ok [1].");
    draft_brief(&llm, "mock", "LLM energy use", &evidence(2)).expect("draft");
    let prompts = llm.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("LLM energy use"));
    assert!(prompt.contains("[1] Paper 1 | Ada Lovelace | published 2025-05-01T00:00:00Z"));
    assert!(prompt.contains("[2] Paper 2"));
    assert!(prompt.contains("Finding number 2 about datacenter energy."));
}

#[test]
fn no_evidence_means_no_model_call() {
    let llm = MockLlm::new("Ok [1].");
    let err = draft_brief(&llm, "mock", "LLM energy use", &[]).expect_err("should error");
    assert_eq!(err.code, "AI_CITATION_REQUIRED");
    let err = draft_brief(&llm, "mock", "  ", &evidence(1)).expect_err("should error");
    assert_eq!(err.code, "INVALID_ARGUMENT");
    assert!(llm.prompts.borrow().is_empty());
}
