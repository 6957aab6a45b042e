use thiserror::Error;

use super::types::Category;

/// Errors raised while fetching, caching or persisting taxonomies.
///
/// `Clone` because a single fetch result is handed to every caller that coalesced onto it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaxonomyError {
    #[error("failed to fetch {category} taxonomy ({language}): {reason}")]
    Fetch {
        language: String,
        category: Category,
        reason: String,
    },

    /// No cached value exists and the source could not provide one.
    #[error("taxonomy unavailable for {category} ({language}): {reason}")]
    Unavailable {
        language: String,
        category: Category,
        reason: String,
    },

    #[error("failed to build taxonomy HTTP client: {reason}")]
    Client { reason: String },

    #[error("taxonomy store error at {path}: {reason}")]
    Store { path: String, reason: String },

    #[error("unknown taxonomy category: {value}")]
    UnknownCategory { value: String },
}
