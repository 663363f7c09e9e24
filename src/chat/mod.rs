//! Hosted chat model adapter used to narrate analysis results.
//!
//! A [`ChatModel`] opens a [`ChatSession`] seeded with the caller's
//! conversation history. The session keeps its own copy of that history and
//! appends each prompt and reply it exchanges; the caller's history is never
//! modified.

pub mod gemini;

pub use gemini::GeminiChatModel;

use async_trait::async_trait;

use crate::core::{ConversationHistory, Message, Result};

#[async_trait]
pub trait ChatSession: Send {
    /// Sends `prompt` and returns the complete reply text.
    async fn send(&mut self, prompt: &str) -> Result<String>;

    /// Turns exchanged so far, starting with the seed history.
    fn history(&self) -> &[Message];
}

pub trait ChatModel: Send + Sync {
    fn start_session<'a>(&'a self, history: &ConversationHistory) -> Box<dyn ChatSession + 'a>;
}

impl<T: ChatModel + ?Sized> ChatModel for &T {
    fn start_session<'a>(&'a self, history: &ConversationHistory) -> Box<dyn ChatSession + 'a> {
        (**self).start_session(history)
    }
}

impl<T: ChatModel + ?Sized> ChatModel for std::sync::Arc<T> {
    fn start_session<'a>(&'a self, history: &ConversationHistory) -> Box<dyn ChatSession + 'a> {
        (**self).start_session(history)
    }
}
