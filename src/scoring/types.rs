use std::sync::Arc;

use serde::Serialize;

use crate::taxonomy::TaxonomyEntry;

/// One (query, candidate) input to the scorer, tied back to the entry it came from.
#[derive(Debug, Clone)]
pub struct CandidatePair {
    pub query: Arc<str>,
    pub candidate_text: String,
    pub entry: TaxonomyEntry,
}

/// A taxonomy entry with its raw relevance score.
///
/// Scores are only comparable with other candidates from the same scorer call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub entry: TaxonomyEntry,
    pub score: f32,
}

/// Whether the scorer runs a real model or the lexical stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerMode {
    Model,
    Stub,
}

impl ScorerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScorerMode::Model => "model",
            ScorerMode::Stub => "stub",
        }
    }
}
