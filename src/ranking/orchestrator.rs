use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::scoring::{CandidatePair, RelevanceScorer, ScoredCandidate, ScoringError};
use crate::taxonomy::Category;

use super::types::{CategoryFailure, RankedCategoryResult};

/// Runs the scorer over a category's candidates and orders the results.
#[derive(Clone)]
pub struct RankingOrchestrator {
    scorer: Arc<dyn RelevanceScorer>,
}

impl std::fmt::Debug for RankingOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingOrchestrator")
            .field("scorer_mode", &self.scorer.mode())
            .finish()
    }
}

impl RankingOrchestrator {
    pub fn new(scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &Arc<dyn RelevanceScorer> {
        &self.scorer
    }

    /// Scores all pairs in one scorer call and sorts them by descending score.
    ///
    /// Scorer failures are recorded on the result rather than returned, so one category
    /// failing never fails the others. An empty pair list is a valid, error-free result.
    #[instrument(skip(self, category, pairs), fields(category = %category, candidates = pairs.len()))]
    pub async fn rank(&self, category: Category, pairs: Vec<CandidatePair>) -> RankedCategoryResult {
        if pairs.is_empty() {
            debug!("No candidates to rank");
            return RankedCategoryResult::empty(category);
        }

        let scores = match self.scorer.score(&pairs).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, "Scorer call failed");
                return RankedCategoryResult::failed(
                    category,
                    CategoryFailure::ScoringFailed(e.to_string()),
                );
            }
        };

        if let Err(e) = validate_scores(pairs.len(), &scores) {
            warn!(error = %e, "Scorer returned malformed scores");
            return RankedCategoryResult::failed(
                category,
                CategoryFailure::ScoringFailed(e.to_string()),
            );
        }

        let candidates = sort_descending(
            pairs
                .into_iter()
                .zip(scores)
                .map(|(pair, score)| ScoredCandidate {
                    entry: pair.entry,
                    score,
                })
                .collect(),
        );

        debug!(
            top_score = candidates.first().map(|c| c.score),
            "Category ranked"
        );

        RankedCategoryResult {
            category,
            candidates,
            error: None,
            stale: false,
        }
    }
}

/// Checks that there is exactly one finite score per pair.
pub fn validate_scores(expected: usize, scores: &[f32]) -> Result<(), ScoringError> {
    if scores.len() != expected {
        return Err(ScoringError::MalformedResponse {
            reason: format!("expected {} scores, got {}", expected, scores.len()),
        });
    }

    if let Some(position) = scores.iter().position(|s| !s.is_finite()) {
        return Err(ScoringError::MalformedResponse {
            reason: format!("non-finite score at position {}", position),
        });
    }

    Ok(())
}

/// Stable sort by descending score: equal scores keep their taxonomy order.
pub fn sort_descending(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}
