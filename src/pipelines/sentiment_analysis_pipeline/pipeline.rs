use super::model::SentimentAnalysisModel;
use super::scores::SentimentScoreSet;
use super::SentimentClassifier;
use crate::core::{AnalyserError, Result};
use tokenizers::Tokenizer;

pub struct SentimentAnalysisPipeline<M: SentimentAnalysisModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipeline<M> {
    /// Scores `text` into Positive / Neutral / Negative probabilities.
    pub fn classify(&self, text: &str) -> Result<SentimentScoreSet> {
        let probabilities = self
            .model
            .probabilities(&self.tokenizer, text)
            .map_err(AnalyserError::classifier)?;
        tracing::debug!(chars = text.len(), ?probabilities, "classified text");
        SentimentScoreSet::from_probabilities(&probabilities)
    }

    pub fn labels(&self) -> &[String] {
        self.model.labels()
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

impl<M: SentimentAnalysisModel> SentimentClassifier for SentimentAnalysisPipeline<M> {
    fn classify(&self, text: &str) -> Result<SentimentScoreSet> {
        SentimentAnalysisPipeline::classify(self, text)
    }
}
