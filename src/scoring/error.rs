use std::time::Duration;

use thiserror::Error;

use crate::embedding::RerankerError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("reranker error: {0}")]
    Reranker(#[from] RerankerError),

    #[error("scorer backend failed: {reason}")]
    Backend { reason: String },

    /// The scorer answered, but not with one finite score per pair.
    #[error("malformed scorer response: {reason}")]
    MalformedResponse { reason: String },

    #[error("scorer timed out after {after:?}")]
    Timeout { after: Duration },
}
