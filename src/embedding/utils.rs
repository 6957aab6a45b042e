use std::path::Path;

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use super::error::EmbeddingError;

/// Loads `tokenizer.json` from `model_dir`, truncating to `max_len` and padding each batch
/// to its longest sequence.
pub fn load_tokenizer(model_dir: &Path, max_len: usize) -> Result<Tokenizer, EmbeddingError> {
    let path = model_dir.join("tokenizer.json");
    if !path.exists() {
        return Err(EmbeddingError::TokenizerNotFound { path });
    }

    let mut tokenizer =
        Tokenizer::from_file(&path).map_err(|e| EmbeddingError::TokenizerLoadFailed {
            reason: e.to_string(),
        })?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::TokenizerLoadFailed {
            reason: e.to_string(),
        })?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));

    Ok(tokenizer)
}
