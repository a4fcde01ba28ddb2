pub mod draft;
pub mod embeddings;
pub mod evidence;
pub mod guardrails;
pub mod llm;
pub mod ollama;
pub mod retrieve;
pub mod source;
