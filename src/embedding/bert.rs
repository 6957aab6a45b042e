//! BERT-style sequence classifier used as a cross-encoder.
//!
//! Expects a HuggingFace model directory with `config.json` and `model.safetensors` whose
//! classification head emits a single relevance logit.

use candle_core::{DType, Device, IndexOp, Result, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;
use std::sync::Arc;

/// Weight prefixes used by the checkpoints we accept, tried in order.
const ENCODER_PREFIXES: [&str; 2] = ["bert", "roberta"];

struct CrossEncoderHead {
    encoder: BertModel,
    classifier: Linear,
}

impl CrossEncoderHead {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let prefix = ENCODER_PREFIXES
            .iter()
            .find(|p| vb.contains_tensor(&format!("{p}.embeddings.word_embeddings.weight")));

        let encoder = match prefix {
            Some(p) => BertModel::load(vb.pp(*p), config)?,
            None => BertModel::load(vb.clone(), config)?,
        };
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self {
            encoder,
            classifier,
        })
    }

    /// Returns logits shaped `(batch, 1)` from the `[CLS]` position.
    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .encoder
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        let cls = hidden.i((.., 0, ..))?;
        self.classifier.forward(&cls)
    }
}

/// Cheaply cloneable handle to loaded cross-encoder weights.
#[derive(Clone)]
pub struct BertCrossEncoder(Arc<CrossEncoderHead>);

impl BertCrossEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();

        let config_content = std::fs::read_to_string(model_dir.join("config.json"))?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| candle_core::Error::Msg(format!("Failed to parse config: {}", e)))?;

        let weights = model_dir.join("model.safetensors");
        // SAFETY: the weights file is opened read-only and not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device)? };

        Ok(Self(Arc::new(CrossEncoderHead::load(vb, &config)?)))
    }

    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        self.0.forward(input_ids, token_type_ids, attention_mask)
    }
}
