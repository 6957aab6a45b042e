//! Cross-encoder model plumbing.
//!
//! [`reranker`] scores (query, candidate) pairs and backs [`crate::scoring::CrossEncoderScorer`].

/// BERT sequence-classification head used as the cross-encoder.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
pub mod reranker;
/// Tokenizer loading helpers.
pub mod utils;

pub use error::EmbeddingError;
pub use reranker::{Reranker, RerankerConfig, RerankerError};
