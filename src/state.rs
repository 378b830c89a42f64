//! UI-agnostic conversation types
//!
//! These structures hold the chat log independently of how it is rendered,
//! so the terminal UI and the one-shot command share them.

use serde::{Deserialize, Serialize};

/// Greeting the bot opens every conversation with.
pub const GREETING: &str = "Hello I am E-Bot, Ask me about your order-status.";

/// Reply shown in place of the bot's answer when the call fails.
pub const CONNECTION_ERROR: &str = "Error connecting to Server";

/// A single entry in the chat log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
        }
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    /// Label shown above the message body
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Bot => "Bot",
        }
    }
}

/// Append-only, chronologically ordered chat log.
///
/// There is deliberately no way to remove or reorder entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation seeded with the bot greeting
    pub fn new() -> Self {
        Self {
            messages: vec![Message::bot(GREETING)],
        }
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

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The last `n` messages, oldest first
    pub fn tail(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
