use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::embedding::{Reranker, RerankerConfig};

use super::error::ScoringError;
use super::types::{CandidatePair, ScorerMode};

/// External relevance model: one raw score per (query, candidate) pair, in input order.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score(&self, pairs: &[CandidatePair]) -> Result<Vec<f32>, ScoringError>;

    fn mode(&self) -> ScorerMode {
        ScorerMode::Model
    }
}

/// [`RelevanceScorer`] backed by the cross-encoder [`Reranker`].
///
/// Inference is CPU/GPU bound, so each batch runs on the blocking pool.
pub struct CrossEncoderScorer {
    reranker: Arc<Reranker>,
}

impl std::fmt::Debug for CrossEncoderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoderScorer")
            .field("reranker", &self.reranker)
            .finish()
    }
}

impl CrossEncoderScorer {
    pub fn new(config: RerankerConfig) -> Result<Self, ScoringError> {
        Ok(Self {
            reranker: Arc::new(Reranker::load(config)?),
        })
    }

    pub fn stub() -> Result<Self, ScoringError> {
        Self::new(RerankerConfig::stub())
    }

    pub fn reranker(&self) -> &Reranker {
        &self.reranker
    }
}

#[async_trait]
impl RelevanceScorer for CrossEncoderScorer {
    async fn score(&self, pairs: &[CandidatePair]) -> Result<Vec<f32>, ScoringError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let owned: Vec<(Arc<str>, String)> = pairs
            .iter()
            .map(|p| (Arc::clone(&p.query), p.candidate_text.clone()))
            .collect();
        let reranker = Arc::clone(&self.reranker);

        let scores = tokio::task::spawn_blocking(move || {
            let borrowed: Vec<(&str, &str)> = owned
                .iter()
                .map(|(query, candidate)| (query.as_ref(), candidate.as_str()))
                .collect();
            reranker.score_pairs(&borrowed)
        })
        .await
        .map_err(|e| ScoringError::Backend {
            reason: format!("scoring task failed: {}", e),
        })??;

        debug!(pairs = scores.len(), "Cross-encoder batch scored");
        Ok(scores)
    }

    fn mode(&self) -> ScorerMode {
        if self.reranker.is_model_loaded() {
            ScorerMode::Model
        } else {
            ScorerMode::Stub
        }
    }
}
