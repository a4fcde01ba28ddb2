use scout_core::config::ScoringConfig;
use scout_core::error::AppError;

use crate::evidence::{Candidate, RankedCandidate};

/// Blends raw similarity and recency decay into a single rank score.
pub trait RankScorer: Send + Sync {
    fn combine(&self, similarity: f32, decay: f64) -> f64;
}

impl RankScorer for ScoringConfig {
    fn combine(&self, similarity: f32, decay: f64) -> f64 {
        let sim = f64::from(similarity);
        match *self {
            ScoringConfig::Product => sim * decay,
            ScoringConfig::WeightedSum { recency_weight } => {
                (1.0 - recency_weight) * sim + recency_weight * decay
            }
            ScoringConfig::DecayExponent { exponent } => sim * decay.powf(exponent),
        }
    }
}

/// Adapter for plugging a closure in as a scorer.
pub struct FnScorer<F>(pub F);

impl<F> RankScorer for FnScorer<F>
where
    F: Fn(f32, f64) -> f64 + Send + Sync,
{
    fn combine(&self, similarity: f32, decay: f64) -> f64 {
        (self.0)(similarity, decay)
    }
}

/// Score, order and truncate search candidates.
///
/// Order: score desc, then raw similarity desc, then original candidate order.
/// Candidates whose blended score is not finite are dropped.
pub fn rank<D>(
    candidates: &[Candidate],
    decay_lookup: D,
    scorer: &dyn RankScorer,
    k: usize,
) -> Result<Vec<RankedCandidate>, AppError>
where
    D: Fn(&Candidate) -> f64,
{
    if k == 0 {
        return Err(AppError::invalid_argument("k must be positive"));
    }

    let mut scored: Vec<(usize, RankedCandidate)> = Vec::with_capacity(candidates.len());
    for (order, c) in candidates.iter().enumerate() {
        let decay = decay_lookup(c);
        let score = scorer.combine(c.similarity, decay);
        if !score.is_finite() {
            tracing::warn!(position = c.position, similarity = c.similarity, decay, "dropping candidate with non-finite score");
            continue;
        }
        scored.push((
            order,
            RankedCandidate {
                position: c.position,
                similarity: c.similarity,
                decay,
                score,
            },
        ));
    }

    scored.sort_by(|(oa, a), (ob, b)| {
        b.score
            .total_cmp(&a.score)
            .then(b.similarity.total_cmp(&a.similarity))
            .then(oa.cmp(ob))
    });
    scored.truncate(k);
    Ok(scored.into_iter().map(|(_, r)| r).collect())
}

/// Validate a caller-supplied `k` from an untyped request.
pub fn validate_k(k: i64) -> Result<usize, AppError> {
    if k <= 0 {
        return Err(AppError::invalid_argument("k must be positive").with_details(format!("k={k}")));
    }
    usize::try_from(k).map_err(|_| AppError::invalid_argument("k is too large").with_details(format!("k={k}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(position: usize, similarity: f32) -> Candidate {
        Candidate {
            position,
            similarity,
        }
    }

    #[test]
    fn product_policy_prefers_recent_on_equal_similarity() {
        let cands = [cand(0, 0.8), cand(1, 0.8)];
        let decays = [0.25, 1.0];
        let ranked = rank(&cands, |c| decays[c.position], &ScoringConfig::Product, 2).unwrap();
        assert_eq!(ranked[0].position, 1);
        assert!((ranked[0].score - 0.8).abs() < 1e-6);
        assert!((ranked[1].score - 0.2).abs() < 1e-6);
    }

    #[test]
    fn ties_break_on_similarity_then_candidate_order() {
        // Equal scores (0.5): higher raw similarity first.
        let cands = [cand(7, 0.5), cand(3, 1.0), cand(5, 0.5)];
        let decays = |c: &Candidate| if c.position == 3 { 0.5 } else { 1.0 };
        let ranked = rank(&cands, decays, &ScoringConfig::Product, 3).unwrap();
        let order: Vec<usize> = ranked.iter().map(|r| r.position).collect();
        assert_eq!(order, vec![3, 7, 5]);
    }

    #[test]
    fn zero_k_is_rejected() {
        let err = rank(&[cand(0, 1.0)], |_| 1.0, &ScoringConfig::Product, 0).unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
        assert!(validate_k(0).is_err());
        assert!(validate_k(-4).is_err());
        assert_eq!(validate_k(6).unwrap(), 6);
    }

    #[test]
    fn weighted_sum_and_exponent_policies() {
        let ws = ScoringConfig::WeightedSum { recency_weight: 0.25 };
        assert!((ws.combine(0.8, 0.4) - (0.75 * 0.8 + 0.25 * 0.4)).abs() < 1e-6);
        let ex = ScoringConfig::DecayExponent { exponent: 0.0 };
        assert!((ex.combine(0.8, 0.01) - 0.8).abs() < 1e-6);
        let ex1 = ScoringConfig::DecayExponent { exponent: 1.0 };
        assert!((ex1.combine(0.8, 0.5) - ScoringConfig::Product.combine(0.8, 0.5)).abs() < 1e-12);
    }

    #[test]
    fn custom_scorer_and_non_finite_scores() {
        let similarity_only = FnScorer(|sim: f32, _decay: f64| f64::from(sim));
        let cands = [cand(0, 0.2), cand(1, 0.9)];
        let ranked = rank(&cands, |_| 0.1, &similarity_only, 5).unwrap();
        assert_eq!(ranked[0].position, 1);

        let broken = FnScorer(|sim: f32, _decay: f64| if sim > 0.5 { f64::NAN } else { 1.0 });
        let ranked = rank(&cands, |_| 1.0, &broken, 5).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].position, 0);
    }
}
