use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::ScoringError;
use super::scorer::RelevanceScorer;
use super::types::{CandidatePair, ScorerMode};

/// Deterministic [`RelevanceScorer`] for tests.
///
/// Scores come from a table keyed by candidate text (unknown candidates score `default`).
/// Batches containing a candidate registered with [`StubScorer::fail_on`] fail, and batches
/// containing one registered with [`StubScorer::delay_on`] are delayed.
#[derive(Debug, Default)]
pub struct StubScorer {
    scores: RwLock<HashMap<String, f32>>,
    default: f32,
    failing: RwLock<HashMap<String, ScoringFailure>>,
    delays: RwLock<HashMap<String, Duration>>,
    calls: AtomicUsize,
}

/// How a scripted batch failure presents itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringFailure {
    Backend,
    /// Returns one score too few.
    WrongLength,
    /// Returns NaN for every pair.
    NotFinite,
}

impl StubScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: f32) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    pub fn with_score(self, candidate: &str, score: f32) -> Self {
        self.set_score(candidate, score);
        self
    }

    pub fn set_score(&self, candidate: &str, score: f32) {
        self.scores.write().insert(candidate.to_string(), score);
    }

    pub fn fail_on(&self, candidate: &str, failure: ScoringFailure) {
        self.failing.write().insert(candidate.to_string(), failure);
    }

    pub fn delay_on(&self, candidate: &str, delay: Duration) {
        self.delays.write().insert(candidate.to_string(), delay);
    }

    /// Number of `score` calls (one per batch).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceScorer for StubScorer {
    async fn score(&self, pairs: &[CandidatePair]) -> Result<Vec<f32>, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = {
            let delays = self.delays.read();
            pairs
                .iter()
                .filter_map(|p| delays.get(&p.candidate_text).copied())
                .max()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = {
            let failing = self.failing.read();
            pairs
                .iter()
                .find_map(|p| failing.get(&p.candidate_text).copied())
        };

        match failure {
            Some(ScoringFailure::Backend) => Err(ScoringError::Backend {
                reason: "stub scorer failure".to_string(),
            }),
            Some(ScoringFailure::WrongLength) => Ok(vec![self.default; pairs.len().saturating_sub(1)]),
            Some(ScoringFailure::NotFinite) => Ok(vec![f32::NAN; pairs.len()]),
            None => {
                let scores = self.scores.read();
                Ok(pairs
                    .iter()
                    .map(|p| scores.get(&p.candidate_text).copied().unwrap_or(self.default))
                    .collect())
            }
        }
    }

    fn mode(&self) -> ScorerMode {
        ScorerMode::Stub
    }
}
