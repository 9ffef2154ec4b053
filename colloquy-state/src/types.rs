//! The conversation log a chat session appends to

use crate::attachment;
use crate::error::StateResult;
use chrono::{DateTime, Utc};
use colloquy_core::{Completion, Message, Role};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Ordered record of everything said in a conversation
///
/// Besides the messages sent to the endpoint, the log keeps the reasoning of
/// each answer (`thinking`) and any local `debug` notes; those never leave
/// the machine. Messages are never edited once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLog {
    messages: Vec<Message>,
    /// When this conversation was created
    pub created_at: DateTime<Utc>,
    /// When a message was last appended
    pub updated_at: DateTime<Utc>,
}

impl ConversationLog {
    /// Create an empty log
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a log holding previously saved messages
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut log = Self::new();
        log.messages = messages;
        log
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Append a text message
    pub fn push_text(&mut self, role: Role, text: impl Into<String>) {
        self.push(Message::text(role, text));
    }

    /// Append a user message carrying `text` and the image at `path`
    ///
    /// If the image cannot be read the log is left untouched.
    pub async fn push_user_with_image(
        &mut self,
        text: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> StateResult<()> {
        let image = attachment::encode_image(path.as_ref()).await?;
        debug!(mime = %image.mime_type, "Attached image");
        self.push(Message::user_with_image(text, image));
        Ok(())
    }

    /// Append the outcome of a dispatch
    ///
    /// The reasoning goes in as a `thinking` message when there is any,
    /// followed by the answer as an `assistant` message.
    pub fn record_completion(&mut self, completion: &Completion) {
        if completion.has_reasoning() {
            self.push(Message::thinking(completion.reasoning.clone()));
        }
        self.push(Message::assistant(completion.answer.clone()));
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The first non-blank text of the first user message that has one
    pub fn first_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .filter(|m| m.role() == Role::User)
            .find_map(|m| m.content().first_text())
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<Message> for ConversationLog {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        self.messages.extend(iter);
        self.updated_at = Utc::now();
    }
}
