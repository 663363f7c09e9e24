#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;

use sentiment_narrator::{
    ChatModel, ChatSession, ConversationHistory, Message, Result, SentimentClassifier,
    SentimentScoreSet,
};

/// Classifier that scores by keyword and records every text it is asked about.
#[derive(Default)]
pub struct KeywordClassifier {
    calls: Mutex<Vec<String>>,
}

impl KeywordClassifier {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SentimentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<SentimentScoreSet> {
        self.calls.lock().unwrap().push(text.to_string());
        let lower = text.to_lowercase();
        let scores = if lower.contains("love") || lower.contains("great") {
            [0.91, 0.06, 0.03]
        } else if lower.contains("hate") || lower.contains("awful") {
            [0.04, 0.08, 0.88]
        } else {
            [0.2, 0.6, 0.2]
        };
        Ok(SentimentScoreSet::new(scores))
    }
}

/// Chat model that answers with a fixed reply and remembers what it saw.
pub struct ScriptedChat {
    reply: String,
    prompts: Mutex<Vec<String>>,
    seeds: Mutex<Vec<usize>>,
}

impl ScriptedChat {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
            seeds: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// History length each session was opened with.
    pub fn seed_lengths(&self) -> Vec<usize> {
        self.seeds.lock().unwrap().clone()
    }
}

impl ChatModel for ScriptedChat {
    fn start_session<'a>(&'a self, history: &ConversationHistory) -> Box<dyn ChatSession + 'a> {
        self.seeds.lock().unwrap().push(history.len());
        Box::new(ScriptedSession {
            chat: self,
            history: history.messages().to_vec(),
        })
    }
}

struct ScriptedSession<'a> {
    chat: &'a ScriptedChat,
    history: Vec<Message>,
}

#[async_trait]
impl ChatSession for ScriptedSession<'_> {
    async fn send(&mut self, prompt: &str) -> Result<String> {
        self.chat.prompts.lock().unwrap().push(prompt.to_string());
        self.history.push(Message::user(prompt));
        self.history.push(Message::model(&self.chat.reply));
        Ok(self.chat.reply.clone())
    }

    fn history(&self) -> &[Message] {
        &self.history
    }
}
