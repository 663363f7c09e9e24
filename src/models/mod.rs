pub mod distilbert;
pub mod implementations;

pub use implementations::{DistilBertOptions, SentimentDistilBertModel, MULTILINGUAL_SENTIMENT_MODEL};
