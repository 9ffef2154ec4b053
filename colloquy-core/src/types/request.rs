//! Request types for chat completions

use crate::types::message::Message;
use serde_json::{Map, Value};

/// A model identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model(pub String);

impl Model {
    /// Create a new model identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-form request options passed through to the endpoint untouched
///
/// Keys keep their insertion order. Nothing here is validated; the endpoint
/// decides what `temperature`, `enable_thinking` or any vendor flag mean.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(Map<String, Value>);

impl Options {
    /// Empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary option
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set the sampling temperature
    pub fn temperature(self, temp: f32) -> Self {
        self.set("temperature", temp)
    }

    /// Set top-p nucleus sampling
    pub fn top_p(self, p: f32) -> Self {
        self.set("top_p", p)
    }

    /// Toggle streaming (on unless set to `false`)
    pub fn stream(self, enabled: bool) -> Self {
        self.set("stream", enabled)
    }

    /// Toggle the reasoning channel on endpoints that expose `enable_thinking`
    pub fn enable_thinking(self, enabled: bool) -> Self {
        self.set("enable_thinking", enabled)
    }

    /// Look up an option
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the caller asked for a streamed response
    pub fn is_streaming(&self) -> bool {
        self.0
            .get("stream")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Overlay `other` on top of these options; keys in `other` win
    pub fn merged(mut self, other: &Options) -> Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    /// Iterate over the options in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of options set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no options are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Project a conversation onto the messages the endpoint accepts
///
/// Keeps `system`, `user` and `assistant` messages in their original order with
/// content untouched; local-only roles are dropped.
pub fn sanitize(history: &[Message]) -> Vec<Message> {
    history
        .iter()
        .filter(|msg| msg.role().is_transportable())
        .cloned()
        .collect()
}

/// A streaming chat-completion request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The model to use
    pub model: Model,
    /// The conversation messages, already sanitized
    pub messages: Vec<Message>,
    /// Pass-through options
    pub options: Options,
}

impl Request {
    /// Create a new request builder
    pub fn builder(model: impl Into<Model>) -> RequestBuilder {
        RequestBuilder {
            model: model.into(),
            messages: Vec::new(),
            options: Options::default(),
        }
    }

    /// Build a request from a full history, dropping local-only roles
    pub fn from_history(model: impl Into<Model>, history: &[Message], options: Options) -> Self {
        Self {
            model: model.into(),
            messages: sanitize(history),
            options,
        }
    }
}

/// Builder for Request
pub struct RequestBuilder {
    model: Model,
    messages: Vec<Message>,
    options: Options,
}

impl RequestBuilder {
    /// Add a message
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add multiple messages
    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Set options
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temp: f32) -> Self {
        self.options = self.options.temperature(temp);
        self
    }

    /// Build the request; local-only roles are dropped here as well
    pub fn build(self) -> Request {
        Request {
            model: self.model,
            messages: sanitize(&self.messages),
            options: self.options,
        }
    }
}
