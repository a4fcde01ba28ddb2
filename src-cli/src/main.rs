use std::fs;
use std::path::Path;

use clap::Parser;
use scout_ai::draft::draft_brief;
use scout_ai::embeddings::ollama_embed::OllamaEmbedder;
use scout_ai::llm::ollama_llm::OllamaLlm;
use scout_ai::ollama::{has_model, OllamaClient};
use scout_ai::retrieve::{EvidenceAssembler, EvidenceRequest, EvidenceRun};
use scout_ai::source::{ArxivSource, DocumentSource};
use scout_core::config::ScoutConfig;
use scout_core::domain::ValidationWarning;
use scout_core::error::AppError;
use scout_core::report::{render_evidence_markdown, save_brief};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("SCOUT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<ScoutConfig, AppError> {
    let mut config = ScoutConfig::load(cli.config.as_deref())?;
    if let Some(weeks) = cli.half_life_weeks {
        config = config.with_half_life_weeks(weeks)?;
    }
    Ok(config)
}

fn apply_overrides(
    config: ScoutConfig,
    papers: Option<usize>,
    k: Option<usize>,
) -> Result<ScoutConfig, AppError> {
    let config = match papers {
        Some(count) => config.with_paper_count(count)?,
        None => config,
    };
    match k {
        Some(k) => config.with_evidence_k(k),
        None => Ok(config),
    }
}

fn print_warnings(warnings: &[ValidationWarning]) {
    for w in warnings {
        match &w.details {
            Some(d) => eprintln!("warning: [{}] {} ({d})", w.code, w.message),
            None => eprintln!("warning: [{}] {}", w.code, w.message),
        }
    }
}

fn fetch_and_assemble(config: &ScoutConfig, query: &str) -> Result<EvidenceRun, AppError> {
    let client = OllamaClient::new(&config.ollama_base_url)?;
    let embedder = OllamaEmbedder::new(client, config.embed_timeout());
    let source = ArxivSource::new(config.arxiv_api_url.clone(), config.fetch_timeout());

    let documents = source.fetch(query, config.paper_count)?;
    tracing::info!(documents = documents.len(), "fetched papers");

    let assembler = EvidenceAssembler::new(config.clone(), &embedder)?;
    assembler.assemble(query, &documents, config.evidence_k)
}

fn run_brief(config: ScoutConfig, query: &str, out: &Path) -> Result<(), AppError> {
    let run = fetch_and_assemble(&config, query)?;
    print_warnings(&run.warnings);
    if run.evidence.is_empty() {
        return Err(AppError::new(
            "AI_CITATION_REQUIRED",
            "No evidence found for the query; nothing to brief",
        ));
    }

    let client = OllamaClient::new(&config.ollama_base_url)?;
    let llm = OllamaLlm::new(client, config.llm_timeout());
    let draft = draft_brief(&llm, &config.llm_model, query, &run.evidence)?;

    let today = OffsetDateTime::now_utc().date();
    let path = save_brief(out, today, query, &draft.markdown)?;
    println!("{}", path.display());
    Ok(())
}

fn run_evidence(config: ScoutConfig, query: &str, json: bool) -> Result<(), AppError> {
    let run = fetch_and_assemble(&config, query)?;
    if json {
        let text = serde_json::to_string_pretty(&run).map_err(|e| {
            AppError::new("OUTPUT_FAILED", "Failed to serialize evidence").with_details(e.to_string())
        })?;
        println!("{text}");
    } else {
        print_warnings(&run.warnings);
        println!("{}", render_evidence_markdown(query, &run.evidence));
    }
    Ok(())
}

fn read_request(path: &Path) -> Result<EvidenceRequest, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::invalid_argument("Failed to read request file")
            .with_details(format!("path={}; err={e}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::invalid_argument("Request file is not a valid evidence request")
            .with_details(format!("path={}; err={e}", path.display()))
    })
}

fn rank_request(config: ScoutConfig, input: &Path) -> Result<EvidenceRun, AppError> {
    let request = read_request(input)?;
    let client = OllamaClient::new(&config.ollama_base_url)?;
    let embedder = OllamaEmbedder::new(client, config.embed_timeout());
    let assembler = EvidenceAssembler::new(config, &embedder)?;
    assembler.handle_request(&request)
}

/// Prints `{evidence, warnings}` on success and `{error}` otherwise, so callers
/// always get JSON on stdout.
fn run_rank(config: ScoutConfig, input: &Path) -> Result<(), AppError> {
    let result = rank_request(config, input);
    let body = match &result {
        Ok(run) => serde_json::json!({ "evidence": run.evidence, "warnings": run.warnings }),
        Err(e) => serde_json::json!({ "error": e }),
    };
    println!("{body:#}");
    result.map(|_| ())
}

fn run_health(config: &ScoutConfig) -> Result<(), AppError> {
    let client = OllamaClient::new(&config.ollama_base_url)?;
    let installed = client.health_check()?;
    println!("ok: {} ({} models)", client.base_url(), installed.len());
    for model in [&config.embed_model, &config.llm_model] {
        if !has_model(&installed, model) {
            eprintln!("warning: model {model} is not installed; run `ollama pull {model}`");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;
    match cli.command {
        Commands::Brief {
            query,
            papers,
            k,
            out,
        } => run_brief(apply_overrides(config, papers, k)?, &query, &out),
        Commands::Evidence {
            query,
            papers,
            k,
            json,
        } => run_evidence(apply_overrides(config, papers, k)?, &query, json),
        Commands::Rank { input } => run_rank(config, &input),
        Commands::Health => run_health(&config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_request(name: &str, body: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("paper-scout-{name}-{nanos}.json"));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn rank_request_rejects_bad_k_before_embedding() {
        let path = write_request(
            "bad-k",
            r#"{"query": "LLM energy use", "corpus": [], "k": 0}"#,
        );
        let err = rank_request(ScoutConfig::default(), &path).unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rank_request_with_empty_corpus_is_empty() {
        let path = write_request(
            "empty",
            r#"{"query": "LLM energy use", "corpus": [], "k": 3}"#,
        );
        let run = rank_request(ScoutConfig::default(), &path).unwrap();
        assert!(run.evidence.is_empty());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unreadable_request_is_invalid_argument() {
        let err = read_request(Path::new("/nonexistent/request.json")).unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }
}
