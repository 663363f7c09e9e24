pub mod analysis;
pub mod chat;
pub mod core;
mod loaders;
pub mod models;
pub mod pipelines;
pub mod session;
pub mod streaming;

// Re-export core types
pub use crate::core::{AnalyserError, ChatConfig, ConversationHistory, Message, Result};

pub use analysis::{AnalysisReport, AnalysisRequest, Analyser, BarChart, UploadedTable};
pub use chat::{ChatModel, ChatSession, GeminiChatModel};
pub use pipelines::sentiment_analysis_pipeline::{
    RankedResult, SentimentClassifier, SentimentLabel, SentimentScoreSet,
};
pub use session::{Command, InputMode, Notice, Session, UiEvent};
pub use streaming::NarrationStream;
