//! Message types for conversations

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of a message in a conversation
///
/// Only `System`, `User` and `Assistant` are sent to the endpoint. `Thinking`
/// and `Debug` are local annotations kept in the log for later review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Reasoning trace captured from the endpoint
    Thinking,
    /// Local diagnostic note
    Debug,
}

impl Role {
    /// Lowercase wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Thinking => "thinking",
            Role::Debug => "debug",
        }
    }

    /// Whether messages with this role may be sent to the endpoint
    pub fn is_transportable(&self) -> bool {
        matches!(self, Role::System | Role::User | Role::Assistant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image content, always carried inline as base64
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// MIME type (e.g., "image/png")
    pub mime_type: String,
    /// Base64-encoded image data
    pub data: String,
}

impl Image {
    /// Create an image from a MIME type and base64 payload
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Render as a `data:` URI
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parse a `data:<mime>;base64,<payload>` URI
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::Validation("image URL is not a data URI".to_string()))?;
        let (mime_type, data) = rest.split_once(";base64,").ok_or_else(|| {
            Error::Validation("image data URI is not base64-encoded".to_string())
        })?;
        if mime_type.is_empty() {
            return Err(Error::Validation(
                "image data URI has no MIME type".to_string(),
            ));
        }
        Ok(Self::new(mime_type, data))
    }

    /// File extension derived from the MIME subtype ("image/png" -> "png")
    pub fn extension(&self) -> &str {
        let subtype = self
            .mime_type
            .split_once('/')
            .map(|(_, sub)| sub)
            .unwrap_or(&self.mime_type);
        let end = subtype
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(subtype.len());
        match &subtype[..end] {
            "" => "bin",
            ext => ext,
        }
    }
}

/// One part of a multi-part message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WirePart", into = "WirePart")]
pub enum ContentPart {
    /// A text segment
    Text {
        /// The text
        text: String,
    },
    /// An inline image
    Image(Image),
}

impl ContentPart {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }
}

/// Content of a message: plain text or an ordered list of parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text content
    Text(String),
    /// Multi-part content (text and images)
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Get text content if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Parts(_) => None,
        }
    }

    /// First text that is not blank, looking into parts if needed
    pub fn first_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) if !s.trim().is_empty() => Some(s),
            Content::Text(_) => None,
            Content::Parts(parts) => parts.iter().find_map(|part| match part {
                ContentPart::Text { text } if !text.trim().is_empty() => Some(text.as_str()),
                _ => None,
            }),
        }
    }

    /// Whether any part is an image
    pub fn has_images(&self) -> bool {
        match self {
            Content::Text(_) => false,
            Content::Parts(parts) => parts.iter().any(|p| matches!(p, ContentPart::Image(_))),
        }
    }
}

// Conversion implementations
impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for Content {
    fn from(parts: Vec<ContentPart>) -> Self {
        Content::Parts(parts)
    }
}

/// A message in a conversation
///
/// Fields are read through accessors so every message goes through a
/// constructor; images only ever appear in `user` messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    role: Role,
    content: Content,
}

impl Message {
    /// Create a message, checking that images only appear in user messages
    pub fn new(role: Role, content: impl Into<Content>) -> Result<Self> {
        let content = content.into();
        if role != Role::User && content.has_images() {
            return Err(Error::Validation(format!(
                "images are only allowed in user messages, got role '{}'",
                role
            )));
        }
        Ok(Self { role, content })
    }

    /// The role of the message sender
    pub fn role(&self) -> Role {
        self.role
    }

    /// The content of the message
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Split into role and content
    pub fn into_parts(self) -> (Role, Content) {
        (self.role, self.content)
    }

    /// Create a simple text message
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Content::Text(text.into()),
        }
    }

    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// Create a reasoning-trace message
    pub fn thinking(text: impl Into<String>) -> Self {
        Self::text(Role::Thinking, text)
    }

    /// Create a debug note
    pub fn debug(text: impl Into<String>) -> Self {
        Self::text(Role::Debug, text)
    }

    /// Create a user message with text followed by an image
    pub fn user_with_image(text: impl Into<String>, image: Image) -> Self {
        Self {
            role: Role::User,
            content: Content::Parts(vec![ContentPart::text(text), ContentPart::Image(image)]),
        }
    }
}

// Wire shapes, matching the chat-completions content-part format

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart {
    Text { text: String },
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Serialize, Deserialize)]
struct WireImageUrl {
    url: String,
}

impl TryFrom<WirePart> for ContentPart {
    type Error = Error;

    fn try_from(part: WirePart) -> Result<Self> {
        match part {
            WirePart::Text { text } => Ok(ContentPart::Text { text }),
            WirePart::ImageUrl { image_url } => {
                Image::from_data_uri(&image_url.url).map(ContentPart::Image)
            }
        }
    }
}

impl From<ContentPart> for WirePart {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text { text } => WirePart::Text { text },
            ContentPart::Image(image) => WirePart::ImageUrl {
                image_url: WireImageUrl {
                    url: image.data_uri(),
                },
            },
        }
    }
}

#[derive(Deserialize)]
struct RawMessage {
    role: Role,
    content: Content,
}

impl TryFrom<RawMessage> for Message {
    type Error = Error;

    fn try_from(raw: RawMessage) -> Result<Self> {
        Message::new(raw.role, raw.content)
    }
}
