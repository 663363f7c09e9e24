use anyhow::{Error as E, Result as AnyhowResult};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer, TruncationParams};

use crate::core::ModelOptions;
use crate::loaders::{HfLoader, WeightsLoader};
use crate::models::distilbert::{Config, DistilBertForSequenceClassification};
use crate::pipelines::sentiment_analysis_pipeline::{ModelFiles, SentimentAnalysisModel};

/// Multilingual DistilBERT student distilled for three-way sentiment.
pub const MULTILINGUAL_SENTIMENT_MODEL: &str =
    "lxyuan/distilbert-base-multilingual-cased-sentiments-student";

/// Where to find the sentiment classifier's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistilBertOptions {
    pub model_id: String,
    pub tokenizer_file: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub weight_file: Option<PathBuf>,
}

impl Default for DistilBertOptions {
    fn default() -> Self {
        Self {
            model_id: MULTILINGUAL_SENTIMENT_MODEL.to_string(),
            tokenizer_file: None,
            config_file: None,
            weight_file: None,
        }
    }
}

impl ModelOptions for DistilBertOptions {
    fn cache_key(&self) -> String {
        let local = |path: &Option<PathBuf>| {
            path.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        format!(
            "{}|{}|{}",
            self.model_id,
            local(&self.config_file),
            local(&self.weight_file)
        )
    }
}

async fn local_or_hub(
    local: &Option<PathBuf>,
    fetch: impl std::future::Future<Output = AnyhowResult<PathBuf>>,
) -> AnyhowResult<PathBuf> {
    match local {
        Some(path) => Ok(path.clone()),
        None => fetch.await,
    }
}

fn read_config(path: &Path) -> AnyhowResult<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| E::msg(format!("Failed to read config file {path:?}: {e}")))?;
    serde_json::from_str(&content).map_err(|e| E::msg(format!("Failed to parse model config: {e}")))
}

/// Sentiment classifier backed by [`DistilBertForSequenceClassification`].
#[derive(Clone)]
pub struct SentimentDistilBertModel {
    model: DistilBertForSequenceClassification,
    labels: Vec<String>,
}

impl SentimentDistilBertModel {
    pub fn load(config_file: &Path, weights_file: &Path, device: Device) -> AnyhowResult<Self> {
        let config = read_config(config_file)?;

        let dtype = DType::F32;
        let vb = if weights_file
            .extension()
            .is_some_and(|ext| ext == "safetensors")
        {
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_file], dtype, &device)? }
        } else if weights_file.extension().is_some_and(|ext| ext == "bin") {
            VarBuilder::from_pth(weights_file, dtype, &device)?
        } else {
            anyhow::bail!("Unsupported weight file format: {:?}", weights_file);
        };

        let model = DistilBertForSequenceClassification::load(vb, &config)?;
        let labels = config.labels();
        let expected = ["positive", "neutral", "negative"];
        if labels.len() == expected.len()
            && labels
                .iter()
                .zip(expected)
                .any(|(label, expected)| !label.eq_ignore_ascii_case(expected))
        {
            tracing::warn!(
                ?labels,
                "classifier labels differ from positive/neutral/negative; scores are mapped by position"
            );
        }

        Ok(Self { model, labels })
    }

    pub fn predict_probabilities(&self, tokenizer: &Tokenizer, text: &str) -> AnyhowResult<Vec<f32>> {
        let tokens = tokenizer
            .encode(text, true)
            .map_err(|e| E::msg(format!("Tokenization error: {e}")))?;
        Ok(self
            .model
            .probabilities(tokens.get_ids(), tokens.get_attention_mask())?)
    }
}

impl SentimentAnalysisModel for SentimentDistilBertModel {
    type Options = DistilBertOptions;

    async fn resolve_files(options: &Self::Options) -> AnyhowResult<ModelFiles> {
        let repo = options.model_id.as_str();
        let config = local_or_hub(
            &options.config_file,
            HfLoader::new(repo, "config.json").load(),
        )
        .await?;
        let weights = local_or_hub(&options.weight_file, WeightsLoader::new(repo).load()).await?;
        let tokenizer = local_or_hub(
            &options.tokenizer_file,
            HfLoader::new(repo, "tokenizer.json").load(),
        )
        .await?;
        Ok(ModelFiles {
            config,
            weights,
            tokenizer,
        })
    }

    fn new(files: &ModelFiles, device: Device) -> AnyhowResult<Self> {
        Self::load(&files.config, &files.weights, device)
    }

    fn load_tokenizer(files: &ModelFiles) -> AnyhowResult<Tokenizer> {
        let config = read_config(&files.config)?;
        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        // Single sequences only: no padding, clip to the position table.
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_position_embeddings,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
        Ok(tokenizer)
    }

    fn probabilities(&self, tokenizer: &Tokenizer, text: &str) -> AnyhowResult<Vec<f32>> {
        self.predict_probabilities(tokenizer, text)
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn device(&self) -> &Device {
        self.model.device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_point_at_multilingual_student() {
        let options = DistilBertOptions::default();
        assert_eq!(options.model_id, MULTILINGUAL_SENTIMENT_MODEL);
        assert_eq!(options.cache_key(), format!("{MULTILINGUAL_SENTIMENT_MODEL}||"));
    }

    #[test]
    fn local_weights_change_the_cache_key() {
        let options = DistilBertOptions {
            weight_file: Some(PathBuf::from("/models/student.safetensors")),
            ..Default::default()
        };
        assert!(options.cache_key().ends_with("|/models/student.safetensors"));
    }
}
