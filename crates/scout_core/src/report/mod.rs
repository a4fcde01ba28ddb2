use std::fs;
use std::path::{Path, PathBuf};

use time::Date;

use crate::domain::Evidence;
use crate::error::{codes, AppError};

/// `YYYY-MM-DD_<query slug>.md`. The slug keeps lowercase alphanumerics and folds
/// every other run of characters into a single `_`.
pub fn brief_file_name(date: Date, query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    let mut pending_sep = false;
    for ch in query.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch);
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("brief");
    }
    format!(
        "{:04}-{:02}-{:02}_{slug}.md",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Write a brief under `dir`, creating it if needed. The write goes through a temp
/// file and a rename so readers never see a half-written brief.
pub fn save_brief(dir: &Path, date: Date, query: &str, markdown: &str) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::new(codes::BRIEF_WRITE_FAILED, "Failed to create output directory")
            .with_details(format!("path={}; err={}", dir.display(), e))
    })?;

    let path = dir.join(brief_file_name(date, query));
    let tmp = path.with_extension("md.tmp");
    fs::write(&tmp, markdown.as_bytes()).map_err(|e| {
        AppError::new(codes::BRIEF_WRITE_FAILED, "Failed to write brief")
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    fs::rename(&tmp, &path).map_err(|e| {
        AppError::new(codes::BRIEF_WRITE_FAILED, "Failed to finalize brief write")
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
    })?;
    tracing::info!(path = %path.display(), bytes = markdown.len(), "brief saved");
    Ok(path)
}

/// Deterministic Markdown listing of ranked evidence, for evidence-only runs.
pub fn render_evidence_markdown(query: &str, evidence: &[Evidence]) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Evidence for \"{}\"\n\n", query.trim()));
    if evidence.is_empty() {
        md.push_str("_No evidence found._\n");
        return md;
    }
    for (i, e) in evidence.iter().enumerate() {
        md.push_str(&format!(
            "## [{}] {}\n\n",
            i + 1,
            if e.source.title.is_empty() { "(untitled)" } else { &e.source.title }
        ));
        if !e.source.authors.is_empty() {
            md.push_str(&format!("- Authors: {}\n", e.source.authors.join(", ")));
        }
        md.push_str(&format!("- Published: {}\n", e.source.published));
        md.push_str(&format!("- Link: {}\n", e.source.id));
        md.push_str(&format!(
            "- Score: {:.4} (similarity {:.4}, recency {:.4})\n\n",
            e.score, e.similarity, e.decay
        ));
        md.push_str(&format!("> {}\n\n", e.text));
    }
    md
}
