//! DistilBERT encoder with a sequence classification head.
//!
//! Loads Hugging Face `DistilBertForSequenceClassification` checkpoints, such as
//! the multilingual sentiment student model the analyser uses:
//! - learned absolute position embeddings
//! - post-norm transformer blocks with GELU feed-forward layers
//! - `[CLS]` pooling followed by `pre_classifier` + ReLU + `classifier`
//!
//! # Quick Start
//! ```rust,no_run
//! // let vb = VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device)?;
//! // let model = DistilBertForSequenceClassification::load(vb, &config)?;
//! // let logits = model.forward(&input_ids, &attention_mask)?; // (batch, num_labels)
//! ```

use candle_core::{DType, Device, IndexOp, Module, Result, Tensor, D};
use candle_nn::{embedding, layer_norm, linear, ops::softmax, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

const LAYER_NORM_EPS: f64 = 1e-12;
const MIN_VALUE_F64: f64 = f32::MIN as f64;

fn default_max_position_embeddings() -> usize {
    512
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub vocab_size: usize,
    pub dim: usize,
    pub n_layers: usize,
    pub n_heads: usize,
    pub hidden_dim: usize,
    #[serde(default = "default_max_position_embeddings")]
    pub max_position_embeddings: usize,
    #[serde(default)]
    pub pad_token_id: u32,
    #[serde(default)]
    pub id2label: HashMap<String, String>,
}

impl Config {
    /// Labels in logit order. Ids missing from `id2label` fall back to `LABEL_{id}`.
    pub fn labels(&self) -> Vec<String> {
        let count = self
            .id2label
            .keys()
            .filter_map(|id| id.parse::<usize>().ok())
            .map(|id| id + 1)
            .max()
            .unwrap_or(0);
        (0..count)
            .map(|id| {
                self.id2label
                    .get(&id.to_string())
                    .cloned()
                    .unwrap_or_else(|| format!("LABEL_{id}"))
            })
            .collect()
    }
}

/// Token plus learned position embeddings.
#[derive(Debug, Clone)]
struct Embeddings {
    word_embeddings: Embedding,
    position_embeddings: Embedding,
    norm: LayerNorm,
}

impl Embeddings {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let word_embeddings = embedding(config.vocab_size, config.dim, vb.pp("word_embeddings"))?;
        let position_embeddings = embedding(
            config.max_position_embeddings,
            config.dim,
            vb.pp("position_embeddings"),
        )?;
        let norm = layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("LayerNorm"))?;
        Ok(Self {
            word_embeddings,
            position_embeddings,
            norm,
        })
    }

    fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let seq_len = input_ids.dim(1)?;
        let position_ids = Tensor::arange(0u32, seq_len as u32, input_ids.device())?.unsqueeze(0)?;

        let tokens = input_ids.apply(&self.word_embeddings)?;
        let positions = position_ids.apply(&self.position_embeddings)?;
        tokens.broadcast_add(&positions)?.apply(&self.norm)
    }
}

/// Multi-head self attention.
#[derive(Debug, Clone)]
struct Attention {
    q_lin: Linear,
    k_lin: Linear,
    v_lin: Linear,
    out_lin: Linear,
    num_heads: usize,
    head_dim: usize,
}

impl Attention {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let dim = config.dim;
        Ok(Self {
            q_lin: linear(dim, dim, vb.pp("q_lin"))?,
            k_lin: linear(dim, dim, vb.pp("k_lin"))?,
            v_lin: linear(dim, dim, vb.pp("v_lin"))?,
            out_lin: linear(dim, dim, vb.pp("out_lin"))?,
            num_heads: config.n_heads,
            head_dim: dim / config.n_heads,
        })
    }

    fn split_heads(&self, xs: &Tensor) -> Result<Tensor> {
        let (batch, seq_len, _) = xs.dims3()?;
        xs.reshape((batch, seq_len, self.num_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let (batch, seq_len, dim) = hidden_states.dims3()?;

        let q = self.split_heads(&hidden_states.apply(&self.q_lin)?)?;
        let k = self.split_heads(&hidden_states.apply(&self.k_lin)?)?;
        let v = self.split_heads(&hidden_states.apply(&self.v_lin)?)?;

        let q = (q * (self.head_dim as f64).powf(-0.5))?;
        let scores = q.matmul(&k.t()?)?.broadcast_add(attention_mask)?;
        let probs = softmax(&scores, D::Minus1)?;

        probs
            .matmul(&v)?
            .transpose(1, 2)?
            .reshape((batch, seq_len, dim))?
            .apply(&self.out_lin)
    }
}

#[derive(Debug, Clone)]
struct FeedForward {
    lin1: Linear,
    lin2: Linear,
}

impl FeedForward {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        Ok(Self {
            lin1: linear(config.dim, config.hidden_dim, vb.pp("lin1"))?,
            lin2: linear(config.hidden_dim, config.dim, vb.pp("lin2"))?,
        })
    }
}

impl Module for FeedForward {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        xs.apply(&self.lin1)?.gelu_erf()?.apply(&self.lin2)
    }
}

/// Post-norm transformer block.
#[derive(Debug, Clone)]
struct TransformerBlock {
    attention: Attention,
    sa_layer_norm: LayerNorm,
    ffn: FeedForward,
    output_layer_norm: LayerNorm,
}

impl TransformerBlock {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        Ok(Self {
            attention: Attention::load(vb.pp("attention"), config)?,
            sa_layer_norm: layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("sa_layer_norm"))?,
            ffn: FeedForward::load(vb.pp("ffn"), config)?,
            output_layer_norm: layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("output_layer_norm"))?,
        })
    }

    fn forward(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let attention_output = self.attention.forward(hidden_states, attention_mask)?;
        let hidden_states = (attention_output + hidden_states)?.apply(&self.sa_layer_norm)?;
        let ffn_output = hidden_states.apply(&self.ffn)?;
        (ffn_output + hidden_states)?.apply(&self.output_layer_norm)
    }
}

/// Encoder weights shared between clones of a classifier.
#[derive(Debug, Clone)]
pub struct DistilBertModel {
    embeddings: Embeddings,
    layers: Vec<TransformerBlock>,
    dtype: DType,
}

impl DistilBertModel {
    pub fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let embeddings = Embeddings::load(vb.pp("embeddings"), config)?;
        let layers = (0..config.n_layers)
            .map(|index| TransformerBlock::load(vb.pp(format!("transformer.layer.{index}")), config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            embeddings,
            layers,
            dtype: vb.dtype(),
        })
    }

    /// Turns a `(batch, seq_len)` padding mask into an additive
    /// `(batch, 1, 1, seq_len)` attention bias.
    fn attention_bias(&self, mask: &Tensor) -> Result<Tensor> {
        let (batch_size, seq_len) = mask.dims2()?;
        let mask = mask.to_dtype(self.dtype)?;
        let inverted_mask = (1.0 - mask)?;
        (inverted_mask * MIN_VALUE_F64)?.reshape((batch_size, 1, 1, seq_len))
    }

    /// Hidden states with shape `(batch_size, sequence_length, dim)`.
    pub fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let bias = self.attention_bias(attention_mask)?;
        let mut hidden_states = self.embeddings.forward(input_ids)?;
        for layer in &self.layers {
            hidden_states = layer.forward(&hidden_states, &bias)?;
        }
        Ok(hidden_states)
    }
}

/// DistilBERT with the `pre_classifier` / `classifier` head.
#[derive(Debug, Clone)]
pub struct DistilBertForSequenceClassification {
    encoder: Arc<DistilBertModel>,
    pre_classifier: Linear,
    classifier: Linear,
    device: Device,
}

impl DistilBertForSequenceClassification {
    pub fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let encoder = Arc::new(DistilBertModel::load(vb.pp("distilbert"), config)?);
        let num_labels = config.labels().len();
        let pre_classifier = linear(config.dim, config.dim, vb.pp("pre_classifier"))?;
        let classifier = linear(config.dim, num_labels, vb.pp("classifier"))?;
        Ok(Self {
            encoder,
            pre_classifier,
            classifier,
            device: vb.device().clone(),
        })
    }

    /// Classification logits with shape `(batch_size, num_labels)`.
    pub fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let hidden_states = self.encoder.forward(input_ids, attention_mask)?;
        hidden_states
            .i((.., 0, ..))?
            .apply(&self.pre_classifier)?
            .relu()?
            .apply(&self.classifier)
    }

    /// Softmax over the logits of a single, unpadded sequence.
    pub fn probabilities(&self, token_ids: &[u32], attention_mask: &[u32]) -> Result<Vec<f32>> {
        let input_ids = Tensor::new(token_ids, &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(attention_mask, &self.device)?.unsqueeze(0)?;
        let logits = self.forward(&input_ids, &attention_mask)?;
        softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_dtype(DType::F32)?
            .to_vec1::<f32>()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_id_order() {
        let config: Config = serde_json::from_str(
            r#"{
                "vocab_size": 10, "dim": 4, "n_layers": 1, "n_heads": 2, "hidden_dim": 8,
                "id2label": {"2": "negative", "0": "positive", "1": "neutral"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.labels(), vec!["positive", "neutral", "negative"]);
        assert_eq!(config.max_position_embeddings, 512);
    }

    #[test]
    fn zero_initialised_classifier_is_uniform() -> anyhow::Result<()> {
        let config: Config = serde_json::from_str(
            r#"{
                "vocab_size": 16, "dim": 8, "n_layers": 2, "n_heads": 2, "hidden_dim": 16,
                "max_position_embeddings": 32,
                "id2label": {"0": "positive", "1": "neutral", "2": "negative"}
            }"#,
        )?;
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let model = DistilBertForSequenceClassification::load(vb, &config)?;

        let probs = model.probabilities(&[1, 5, 7, 2], &[1, 1, 1, 1])?;
        assert_eq!(probs.len(), 3);
        for p in &probs {
            assert!((p - 1.0 / 3.0).abs() < 1e-5);
        }
        Ok(())
    }
}
