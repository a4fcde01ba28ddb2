pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_LLM_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

pub const DEFAULT_PAPER_COUNT: usize = 12;
pub const DEFAULT_EVIDENCE_K: usize = 6;
pub const DEFAULT_OVERFETCH_FACTOR: usize = 4;
pub const DEFAULT_MAX_CHUNK_TOKENS: usize = 800;
pub const DEFAULT_HALF_LIFE_WEEKS: f64 = 12.0;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
