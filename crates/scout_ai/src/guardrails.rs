use std::collections::BTreeSet;

use scout_core::error::AppError;

/// Numbers cited as `[n]` or `[n, m]` anywhere in `output`.
pub fn cited_numbers(output: &str) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    let mut rest = output;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            break;
        };
        let inner = &after[..close];
        let numbers: Option<Vec<usize>> = inner
            .split(',')
            .map(|part| {
                let part = part.trim();
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    None
                } else {
                    part.parse().ok()
                }
            })
            .collect();
        if let Some(numbers) = numbers {
            out.extend(numbers);
            rest = &after[close + 1..];
        } else {
            // Not a citation; resume just after this '[' so nested brackets still parse.
            rest = after;
        }
    }
    out
}

/// Enforce that a brief cites evidence, and only evidence numbered `1..=evidence_count`.
pub fn enforce_citations(output: &str, evidence_count: usize) -> Result<BTreeSet<usize>, AppError> {
    let cited = cited_numbers(output);
    if cited.is_empty() {
        return Err(AppError::new(
            "AI_CITATION_REQUIRED",
            "Brief must cite evidence as [n]",
        ));
    }
    if let Some(bad) = cited.iter().find(|n| **n == 0 || **n > evidence_count) {
        return Err(AppError::new(
            "AI_CITATION_INVALID",
            "Brief cited evidence that was not provided",
        )
        .with_details(format!("cited={bad}; evidence_count={evidence_count}")));
    }
    Ok(cited)
}
