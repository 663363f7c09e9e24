use serde::Serialize;
use tracing::warn;

use super::error::{AnalyserError, Result};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash-8b";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling parameters sent with every narration request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// Everything needed to talk to the hosted chat model.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
}

impl ChatConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generation: GenerationConfig::default(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reads the credential and optional overrides from the process
    /// environment, loading a `.env` file first when one exists.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            if !e.not_found() {
                warn!("ignoring unreadable .env file: {e}");
            }
        }

        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AnalyserError::MissingApiKey(API_KEY_VAR))?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var(MODEL_VAR) {
            config = config.model(model);
        }
        if let Ok(base_url) = std::env::var(BASE_URL_VAR) {
            config = config.base_url(base_url);
        }
        Ok(config)
    }
}
