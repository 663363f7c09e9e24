use super::model::SentimentAnalysisModel;
use super::pipeline::SentimentAnalysisPipeline;
use crate::core::{global_cache, AnalyserError, ModelOptions};
use crate::models::{DistilBertOptions, SentimentDistilBertModel};
use crate::pipelines::utils::{build_cache_key, DeviceRequest, DeviceSelectable};
use std::path::PathBuf;

pub struct SentimentAnalysisPipelineBuilder<M: SentimentAnalysisModel> {
    options: M::Options,
    device_request: DeviceRequest,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipelineBuilder<M> {
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Default,
        }
    }

    pub async fn build(self) -> anyhow::Result<SentimentAnalysisPipeline<M>>
    where
        M: Clone + Send + Sync + 'static,
    {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.options, &device);
        tracing::info!(model = %self.options.cache_key(), device = ?device.location(), "loading sentiment classifier");

        let files = M::resolve_files(&self.options).await?;
        let model = global_cache()
            .get_or_create(&key, || M::new(&files, device.clone()))
            .await?;

        let label_count = model.labels().len();
        if label_count != 3 {
            return Err(AnalyserError::LabelCount(label_count).into());
        }

        let tokenizer = M::load_tokenizer(&files)?;
        Ok(SentimentAnalysisPipeline { model, tokenizer })
    }
}

impl<M: SentimentAnalysisModel> DeviceSelectable for SentimentAnalysisPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl SentimentAnalysisPipelineBuilder<SentimentDistilBertModel> {
    /// Builder for the multilingual DistilBERT sentiment student model.
    pub fn distilbert() -> Self {
        Self::new(DistilBertOptions::default())
    }

    /// Overrides the Hugging Face model repository ID.
    pub fn model_id(mut self, id: impl Into<String>) -> Self {
        self.options.model_id = id.into();
        self
    }

    /// Uses a local `tokenizer.json` instead of the hub copy.
    pub fn tokenizer_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.tokenizer_file = Some(path.into());
        self
    }

    /// Uses a local `config.json` instead of the hub copy.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.config_file = Some(path.into());
        self
    }

    /// Uses local `.safetensors` or `.bin` weights instead of the hub copy.
    pub fn weight_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.weight_file = Some(path.into());
        self
    }
}
