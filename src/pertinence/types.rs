use serde::Serialize;

use crate::taxonomy::{Category, TaxonomyEntry};

/// Outcome of the pertinence rule for one category.
///
/// Fields are private so the top candidate is present exactly when the decision is pertinent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PertinenceDecision {
    category: Category,
    is_pertinent: bool,
    top_candidate: Option<TaxonomyEntry>,
    threshold: Option<f64>,
}

impl PertinenceDecision {
    pub fn pertinent(category: Category, top: TaxonomyEntry, threshold: f64) -> Self {
        Self {
            category,
            is_pertinent: true,
            top_candidate: Some(top),
            threshold: Some(threshold),
        }
    }

    pub fn not_pertinent(category: Category, threshold: Option<f64>) -> Self {
        Self {
            category,
            is_pertinent: false,
            top_candidate: None,
            threshold,
        }
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn is_pertinent(&self) -> bool {
        self.is_pertinent
    }

    #[inline]
    pub fn top_candidate(&self) -> Option<&TaxonomyEntry> {
        self.top_candidate.as_ref()
    }

    /// `None` when the ranking was empty or failed.
    #[inline]
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }
}
