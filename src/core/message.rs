#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Author of a turn in a narration conversation.
pub enum Role {
    /// Turns written by the person using the analyser.
    User,
    /// Turns written by the hosted chat model.
    Model,
}

impl Role {
    /// Returns the string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// An individual turn in a conversation.
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }

    /// Create a new model message.
    ///
    /// Model messages store replies from the chat service, including the
    /// greeting every session starts with.
    pub fn model(content: &str) -> Self {
        Self {
            role: Role::Model,
            content: content.to_string(),
        }
    }

    /// Get the role of the message.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Get the content of the message.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Greeting the narrator opens every session with.
pub const GREETING: &str =
    "Hey....I am Jarvis your personalized Sentiment Analysis Bot...\nRead the detailed analysis below.";

/// Ordered turns owned by a session and handed to the chat model as context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// History containing only the narrator greeting.
    pub fn seeded() -> Self {
        Self {
            messages: vec![Message::model(GREETING)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn greeting(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|message| message.role() == Role::Model)
            .map(|message| message.content())
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_history_holds_only_the_greeting() {
        let history = ConversationHistory::seeded();
        assert_eq!(history.len(), 1);
        assert_eq!(history.greeting(), Some(GREETING));
        assert_eq!(history.messages()[0].role(), Role::Model);
    }

    #[test]
    fn pushed_turns_keep_order_and_greeting() {
        let mut history = ConversationHistory::seeded();
        history.push(Message::user("First question"));
        history.push(Message::model("First answer"));

        let roles: Vec<Role> = history.messages().iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::Model, Role::User, Role::Model]);
        assert_eq!(history.messages()[2].content(), "First answer");
        assert_eq!(history.greeting(), Some(GREETING));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&Message::model("hi")).unwrap();
        assert_eq!(json, r#"{"role":"model","content":"hi"}"#);
    }
}
