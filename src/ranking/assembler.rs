use std::sync::Arc;

use tracing::debug;

use crate::scoring::CandidatePair;
use crate::taxonomy::{Category, TaxonomyEntry};

/// Text the scorer sees for an entry: the label, followed by the description when present.
pub fn candidate_text(entry: &TaxonomyEntry) -> String {
    match entry.description.as_deref() {
        Some(description) => format!("{}: {}", entry.label, description),
        None => entry.label.clone(),
    }
}

/// Builds one (text, candidate) pair per entry, in taxonomy order.
///
/// Every entry is a candidate; taxonomies are small enough to score exhaustively.
pub fn assemble(text: &str, category: Category, entries: &[TaxonomyEntry]) -> Vec<CandidatePair> {
    let query: Arc<str> = Arc::from(text);

    let pairs: Vec<CandidatePair> = entries
        .iter()
        .map(|entry| CandidatePair {
            query: Arc::clone(&query),
            candidate_text: candidate_text(entry),
            entry: entry.clone(),
        })
        .collect();

    debug!(category = %category, candidates = pairs.len(), "Assembled candidates");
    pairs
}
