pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_BATCH_SIZE, MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;

use std::collections::HashSet;

use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::embedding::bert::BertCrossEncoder;
use crate::embedding::device::select_device;
use crate::embedding::utils::load_tokenizer;

/// Words ignored by the lexical stub scorer.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "can", "to",
    "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through", "during",
    "before", "after", "about", "between", "under", "again", "then", "once", "here", "there",
    "when", "where", "why", "how", "all", "each", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "same", "so", "than", "too", "very", "and", "but", "if", "or",
    "because", "while", "what", "which", "who", "this", "that", "these", "those", "it", "its",
    "de", "la", "le", "les", "des", "du", "et", "el", "los", "las", "y", "en",
];

/// Cross-encoder relevance model.
///
/// With a model directory configured, pairs are scored by a BERT sequence classifier in
/// batches. Without one, a lexical-overlap stub produces deterministic scores.
pub struct Reranker {
    device: candle_core::Device,
    config: RerankerConfig,
    model: Option<BertCrossEncoder>,
    tokenizer: Option<Tokenizer>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        config
            .validate()
            .map_err(|reason| RerankerError::InvalidConfig { reason })?;

        let device = select_device();
        debug!(?device, "Selected compute device for reranker");

        let Some(model_path) = config.model_path.clone() else {
            info!("No reranker model path configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                model: None,
                tokenizer: None,
            });
        };

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !model_path.join(required).exists() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_path.display()),
                });
            }
        }

        info!(model_path = %model_path.display(), "Loading reranker model");

        let model = BertCrossEncoder::load(&model_path, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;
        let tokenizer = load_tokenizer(&model_path, config.max_seq_len)?;

        info!(batch_size = config.batch_size, "Reranker model loaded");

        Ok(Self {
            device,
            config,
            model: Some(model),
            tokenizer: Some(tokenizer),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    /// Scores every `(query, candidate)` pair. Output order matches input order.
    pub fn score_pairs(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankerError> {
        debug!(
            pairs = pairs.len(),
            model_loaded = self.is_model_loaded(),
            "Scoring candidate pairs"
        );

        match (&self.model, &self.tokenizer) {
            (Some(model), Some(tokenizer)) => {
                let mut scores = Vec::with_capacity(pairs.len());
                for chunk in pairs.chunks(self.config.batch_size) {
                    scores.extend(self.score_batch(model, tokenizer, chunk)?);
                }
                Ok(scores)
            }
            _ => Ok(pairs
                .iter()
                .map(|(query, candidate)| lexical_score(query, candidate))
                .collect()),
        }
    }

    fn score_batch(
        &self,
        model: &BertCrossEncoder,
        tokenizer: &Tokenizer,
        pairs: &[(&str, &str)],
    ) -> Result<Vec<f32>, RerankerError> {
        let inputs: Vec<(&str, &str)> = pairs.to_vec();
        let encodings = tokenizer.encode_batch(inputs, true).map_err(|e| {
            RerankerError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let batch = encodings.len();
        let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut type_ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            type_ids.extend_from_slice(encoding.get_type_ids());
            mask.extend_from_slice(encoding.get_attention_mask());
        }

        let ids = Tensor::from_vec(ids, (batch, seq_len), &self.device)?;
        let type_ids = Tensor::from_vec(type_ids, (batch, seq_len), &self.device)?;
        let mask = Tensor::from_vec(mask, (batch, seq_len), &self.device)?;

        let logits = model.forward(&ids, &type_ids, &mask)?;
        let scores = logits.flatten_all()?.to_vec1::<f32>()?;

        if scores.len() != batch {
            return Err(RerankerError::InferenceFailed {
                reason: format!("expected {} logits, got {}", batch, scores.len()),
            });
        }
        Ok(scores)
    }
}

/// Recall-weighted word overlap between query and candidate, in `[0, 1]`.
pub(crate) fn lexical_score(query: &str, candidate: &str) -> f32 {
    fn content_words(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
            .map(str::to_string)
            .collect()
    }

    let query_words = content_words(query);
    let candidate_words = content_words(candidate);

    if query_words.is_empty() || candidate_words.is_empty() {
        return 0.0;
    }

    let matches = query_words.intersection(&candidate_words).count() as f32;
    let union = query_words.union(&candidate_words).count() as f32;

    let recall = matches / candidate_words.len() as f32;
    let jaccard = matches / union;

    0.6 * recall + 0.4 * jaccard
}
