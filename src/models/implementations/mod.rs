pub mod distilbert;

pub use distilbert::{DistilBertOptions, SentimentDistilBertModel, MULTILINGUAL_SENTIMENT_MODEL};
