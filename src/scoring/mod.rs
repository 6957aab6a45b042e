//! Relevance scoring of (query, candidate) pairs.
//!
//! [`RelevanceScorer`] is the seam between ranking and the model: ranking hands over a whole
//! category's pairs in one call and gets one raw score back per pair. Scores are unbounded
//! and only meaningful relative to the other scores of the same call.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{ScoringFailure, StubScorer};
pub use scorer::{CrossEncoderScorer, RelevanceScorer};
pub use types::{CandidatePair, ScoredCandidate, ScorerMode};
