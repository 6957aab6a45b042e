use std::path::PathBuf;
use thiserror::Error;

/// Errors from model-loading utilities shared by the reranker.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("tokenizer not found at path: {path}")]
    TokenizerNotFound { path: PathBuf },

    #[error("failed to load tokenizer: {reason}")]
    TokenizerLoadFailed { reason: String },
}
