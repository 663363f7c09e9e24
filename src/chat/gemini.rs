use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatModel, ChatSession};
use crate::core::{AnalyserError, ChatConfig, ConversationHistory, GenerationConfig, Message, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> From<&'a Message> for Content<'a> {
    fn from(message: &'a Message) -> Self {
        Content {
            role: message.role().as_str(),
            parts: [Part {
                text: message.content(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Message of a failed call: the API's own error text, else the raw body,
/// else the status reason.
fn error_message(status: StatusCode, body: Option<String>) -> String {
    let body = body.filter(|b| !b.trim().is_empty());
    match body {
        Some(body) => serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body),
        None => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiChatModel {
    client: Client,
    config: ChatConfig,
}

impl GeminiChatModel {
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }

    /// Reads `GEMINI_API_KEY` (and optional overrides) from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ChatConfig::from_env()?)
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        let model = self
            .config
            .model
            .strip_prefix("models/")
            .unwrap_or(self.config.model.as_str());
        format!("{}/models/{model}:generateContent", self.config.base_url)
    }

    async fn generate(&self, turns: &[Message]) -> Result<String> {
        let request = GenerateContentRequest {
            contents: turns.iter().map(Content::from).collect(),
            generation_config: &self.config.generation,
        };

        info!(model = %self.config.model, turns = turns.len(), "requesting narration");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(AnalyserError::ChatApi {
                status: status.as_u16(),
                message: error_message(status, body),
            });
        }

        let result: GenerateContentResponse = response.json().await?;
        if let Some(err) = result.error {
            return Err(AnalyserError::ChatApi {
                status: status.as_u16(),
                message: err.message,
            });
        }
        let text = result.into_text().ok_or(AnalyserError::EmptyReply)?;
        debug!(chars = text.len(), "narration received");
        Ok(text)
    }
}

impl ChatModel for GeminiChatModel {
    fn start_session<'a>(&'a self, history: &ConversationHistory) -> Box<dyn ChatSession + 'a> {
        Box::new(GeminiChatSession {
            model: self,
            history: history.messages().to_vec(),
        })
    }
}

/// Conversation with Gemini; the full history is resent on every turn.
pub struct GeminiChatSession<'a> {
    model: &'a GeminiChatModel,
    history: Vec<Message>,
}

#[async_trait]
impl ChatSession for GeminiChatSession<'_> {
    async fn send(&mut self, prompt: &str) -> Result<String> {
        let prompt = Message::user(prompt);
        let mut turns = self.history.clone();
        turns.push(prompt.clone());

        let reply = self.model.generate(&turns).await?;
        self.history.push(prompt);
        self.history.push(Message::model(&reply));
        Ok(reply)
    }

    fn history(&self) -> &[Message] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;

    #[test]
    fn request_uses_gemini_roles_and_generation_config() {
        let turns = vec![Message::model("hello"), Message::user("explain")];
        let generation = GenerationConfig::default();
        let request = GenerateContentRequest {
            contents: turns.iter().map(Content::from).collect(),
            generation_config: &generation,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "model");
        assert_eq!(json["contents"][1]["role"], "user");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "explain");
        assert_eq!(json["generationConfig"]["topK"], 40);
    }

    #[test]
    fn reply_text_joins_all_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Mostly "},{"text":"positive."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Mostly positive."));
    }

    #[test]
    fn missing_candidates_yield_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn endpoint_strips_models_prefix() {
        let model = GeminiChatModel::new(
            ChatConfig::new("key")
                .model("models/gemini-1.5-flash-8b")
                .base_url("http://localhost:1234/v1beta"),
        )
        .unwrap();
        assert_eq!(
            model.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-1.5-flash-8b:generateContent"
        );
    }

    #[test]
    fn role_strings_match_wire_format() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Model.as_str(), "model");
    }

    #[test]
    fn unreadable_or_blank_error_body_falls_back_to_status_reason() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, None),
            "Service Unavailable"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, Some("  ".into())),
            "Bad Gateway"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, Some("plain failure".into())),
            "plain failure"
        );
    }
}
