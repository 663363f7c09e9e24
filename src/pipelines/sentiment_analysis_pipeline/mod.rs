//! Sentiment analysis pipeline: scores a text into Positive / Neutral /
//! Negative probabilities.
//!
//! ## Main Types
//!
//! - [`SentimentAnalysisPipeline`] - tokenizer plus loaded classifier
//! - [`SentimentAnalysisPipelineBuilder`] - device selection, hub or local files
//! - [`SentimentClassifier`] - the seam the analyser depends on
//! - [`SentimentScoreSet`] / [`RankedResult`] - classifier output and its ranking
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_narrator::pipelines::sentiment_analysis_pipeline::*;
//! use sentiment_narrator::pipelines::utils::DeviceSelectable;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::distilbert()
//!     .cpu()
//!     .build()
//!     .await?;
//!
//! let scores = pipeline.classify("I love this")?;
//! println!("Top sentiment: {}", scores.top());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod model;
pub mod pipeline;
pub mod scores;

pub use builder::SentimentAnalysisPipelineBuilder;
pub use model::{ModelFiles, SentimentAnalysisModel};
pub use pipeline::SentimentAnalysisPipeline;
pub use scores::{RankedResult, SentimentLabel, SentimentScore, SentimentScoreSet};

pub use crate::models::{DistilBertOptions, SentimentDistilBertModel};

use crate::core::Result;
use std::sync::Arc;

/// Anything that can score a text. The analyser only talks to this trait so
/// tests can substitute a scripted classifier.
pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> Result<SentimentScoreSet>;
}

impl<T: SentimentClassifier + ?Sized> SentimentClassifier for &T {
    fn classify(&self, text: &str) -> Result<SentimentScoreSet> {
        (**self).classify(text)
    }
}

impl<T: SentimentClassifier + ?Sized> SentimentClassifier for Arc<T> {
    fn classify(&self, text: &str) -> Result<SentimentScoreSet> {
        (**self).classify(text)
    }
}

impl<T: SentimentClassifier + ?Sized> SentimentClassifier for Box<T> {
    fn classify(&self, text: &str) -> Result<SentimentScoreSet> {
        (**self).classify(text)
    }
}
