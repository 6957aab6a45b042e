use thiserror::Error;

use crate::scoring::ScoredCandidate;
use crate::taxonomy::Category;

/// Why a category could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryFailure {
    #[error("taxonomy unavailable: {0}")]
    TaxonomyUnavailable(String),

    #[error("scoring failed: {0}")]
    ScoringFailed(String),

    #[error("timed out: {0}")]
    TimedOut(String),

    #[error("aborted: {0}")]
    Aborted(String),
}

/// One category's candidates, sorted by descending score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCategoryResult {
    pub category: Category,
    /// Sorted by descending score; ties keep taxonomy order. Empty when `error` is set.
    pub candidates: Vec<ScoredCandidate>,
    pub error: Option<CategoryFailure>,
    /// The taxonomy behind this ranking was served stale.
    pub stale: bool,
}

impl RankedCategoryResult {
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            candidates: Vec::new(),
            error: None,
            stale: false,
        }
    }

    pub fn failed(category: Category, error: CategoryFailure) -> Self {
        Self {
            category,
            candidates: Vec::new(),
            error: Some(error),
            stale: false,
        }
    }

    pub fn with_stale(mut self, stale: bool) -> Self {
        self.stale = stale;
        self
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    #[inline]
    pub fn top(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }

    /// Scores in ranked order.
    pub fn scores(&self) -> impl Iterator<Item = f32> + '_ {
        self.candidates.iter().map(|c| c.score)
    }
}
