use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::core::ModelOptions;

/// Local paths of everything a classifier needs to load.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
    pub tokenizer: PathBuf,
}

#[allow(async_fn_in_trait)]
pub trait SentimentAnalysisModel {
    type Options: ModelOptions + std::fmt::Debug + Clone;

    /// Downloads (or locates) the config, weights and tokenizer files.
    async fn resolve_files(options: &Self::Options) -> anyhow::Result<ModelFiles>;

    fn new(files: &ModelFiles, device: candle_core::Device) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn load_tokenizer(files: &ModelFiles) -> anyhow::Result<Tokenizer>;

    /// Softmax probabilities, one per entry of [`labels`](Self::labels).
    fn probabilities(&self, tokenizer: &Tokenizer, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Label names from the model config, in logit order.
    fn labels(&self) -> &[String];

    fn device(&self) -> &candle_core::Device;
}
