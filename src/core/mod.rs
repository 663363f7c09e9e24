pub mod cache;
pub mod config;
pub mod error;
pub mod message;

pub use cache::{global_cache, ModelCache, ModelOptions};
pub use config::{ChatConfig, GenerationConfig};
pub use error::{AnalyserError, Result};
pub use message::{ConversationHistory, Message, Role, GREETING};
