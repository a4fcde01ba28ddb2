//! Run configuration.
//!
//! One immutable [`ScoutConfig`] is built per process (defaults, optionally a TOML
//! file) and handed to the assembler and collaborators. Per-call overrides go
//! through the `with_*` builders, which return a new value.

pub mod defaults;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{codes, AppError};

/// How similarity and recency decay are blended into one rank score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ScoringConfig {
    /// `similarity × decay`.
    Product,
    /// `(1 - recency_weight) × similarity + recency_weight × decay`.
    WeightedSum { recency_weight: f64 },
    /// `similarity × decay^exponent`; 0 disables recency, 1 equals `Product`.
    DecayExponent { exponent: f64 },
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::Product
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Local Ollama endpoint used for embeddings and brief generation.
    pub ollama_base_url: String,
    pub embed_model: String,
    pub llm_model: String,
    pub arxiv_api_url: String,
    /// Papers fetched per query.
    pub paper_count: usize,
    /// Final number of evidence items.
    pub evidence_k: usize,
    /// Search over-fetch multiplier applied to `evidence_k` before re-ranking.
    pub overfetch_factor: usize,
    pub max_chunk_tokens: usize,
    pub half_life_weeks: f64,
    pub scoring: ScoringConfig,
    pub fetch_timeout_secs: u64,
    pub embed_timeout_secs: u64,
    pub llm_timeout_secs: u64,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: defaults::DEFAULT_OLLAMA_BASE_URL.to_string(),
            embed_model: defaults::DEFAULT_EMBED_MODEL.to_string(),
            llm_model: defaults::DEFAULT_LLM_MODEL.to_string(),
            arxiv_api_url: defaults::DEFAULT_ARXIV_API_URL.to_string(),
            paper_count: defaults::DEFAULT_PAPER_COUNT,
            evidence_k: defaults::DEFAULT_EVIDENCE_K,
            overfetch_factor: defaults::DEFAULT_OVERFETCH_FACTOR,
            max_chunk_tokens: defaults::DEFAULT_MAX_CHUNK_TOKENS,
            half_life_weeks: defaults::DEFAULT_HALF_LIFE_WEEKS,
            scoring: ScoringConfig::default(),
            fetch_timeout_secs: defaults::DEFAULT_FETCH_TIMEOUT_SECS,
            embed_timeout_secs: defaults::DEFAULT_EMBED_TIMEOUT_SECS,
            llm_timeout_secs: defaults::DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl ScoutConfig {
    /// Defaults when `path` is `None`, otherwise the TOML file layered over defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::new(codes::CONFIG_INVALID, "Failed to read config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        Self::from_toml_str(&raw).map_err(|e| {
            let details = match e.details.as_deref() {
                Some(d) => format!("path={}; {d}", path.display()),
                None => format!("path={}", path.display()),
            };
            e.with_details(details)
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        let cfg: Self = toml::from_str(raw).map_err(|e| {
            AppError::new(codes::CONFIG_INVALID, "Failed to decode config")
                .with_details(format!("err={e}"))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |field: &str, value: String| {
            AppError::new(codes::CONFIG_INVALID, format!("Invalid config value for {field}"))
                .with_details(format!("{field}={value}"))
        };

        if !(self.half_life_weeks.is_finite() && self.half_life_weeks > 0.0) {
            return Err(invalid("half_life_weeks", self.half_life_weeks.to_string()));
        }
        if self.max_chunk_tokens == 0 {
            return Err(invalid("max_chunk_tokens", "0".to_string()));
        }
        if self.evidence_k == 0 {
            return Err(invalid("evidence_k", "0".to_string()));
        }
        if self.overfetch_factor == 0 {
            return Err(invalid("overfetch_factor", "0".to_string()));
        }
        if self.paper_count == 0 {
            return Err(invalid("paper_count", "0".to_string()));
        }
        for (field, secs) in [
            ("fetch_timeout_secs", self.fetch_timeout_secs),
            ("embed_timeout_secs", self.embed_timeout_secs),
            ("llm_timeout_secs", self.llm_timeout_secs),
        ] {
            if secs == 0 {
                return Err(invalid(field, "0".to_string()));
            }
        }
        match self.scoring {
            ScoringConfig::Product => {}
            ScoringConfig::WeightedSum { recency_weight } => {
                if !(0.0..=1.0).contains(&recency_weight) {
                    return Err(invalid("scoring.recency_weight", recency_weight.to_string()));
                }
            }
            ScoringConfig::DecayExponent { exponent } => {
                if !(exponent.is_finite() && exponent >= 0.0) {
                    return Err(invalid("scoring.exponent", exponent.to_string()));
                }
            }
        }
        Ok(())
    }

    pub fn with_half_life_weeks(mut self, weeks: f64) -> Result<Self, AppError> {
        self.half_life_weeks = weeks;
        self.validate()?;
        Ok(self)
    }

    pub fn with_evidence_k(mut self, k: usize) -> Result<Self, AppError> {
        self.evidence_k = k;
        self.validate()?;
        Ok(self)
    }

    pub fn with_paper_count(mut self, count: usize) -> Result<Self, AppError> {
        self.paper_count = count;
        self.validate()?;
        Ok(self)
    }

    /// Number of nearest chunks requested from the index for a final list of `k`.
    pub fn search_count(&self, k: usize) -> usize {
        k.saturating_mul(self.overfetch_factor.max(1)).max(k)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn embed_timeout(&self) -> Duration {
        Duration::from_secs(self.embed_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ScoutConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.half_life_weeks, 12.0);
        assert_eq!(cfg.max_chunk_tokens, 800);
        assert_eq!(cfg.scoring, ScoringConfig::Product);
    }

    #[test]
    fn search_count_never_below_k() {
        let cfg = ScoutConfig::default();
        assert_eq!(cfg.search_count(6), 24);
        assert_eq!(cfg.search_count(usize::MAX), usize::MAX);
    }

    #[test]
    fn builders_reject_invalid_overrides() {
        let err = ScoutConfig::default().with_half_life_weeks(0.0).unwrap_err();
        assert_eq!(err.code, "CONFIG_INVALID");
        assert!(ScoutConfig::default().with_evidence_k(0).is_err());
        assert!(ScoutConfig::default().with_half_life_weeks(f64::NAN).is_err());
        assert_eq!(ScoutConfig::default().with_evidence_k(3).unwrap().evidence_k, 3);
    }
}
