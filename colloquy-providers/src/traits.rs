//! Common traits for provider implementations

use colloquy_core::{Error, Request, StreamChunk};
use serde_json::Value;

/// Convert requests to provider-specific format
pub trait RequestConverter: Send + Sync {
    /// Convert a generic request to provider-specific JSON
    fn convert_request(&self, request: &Request) -> Result<Value, Error>;
}

/// Parse a complete (non-streamed) response
pub trait ResponseParser: Send + Sync {
    /// Parse provider-specific JSON into a single chunk carrying both channels
    fn parse_response(&self, value: Value) -> Result<StreamChunk, Error>;
}

/// Outcome of parsing one server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// A chunk, possibly empty
    Chunk(StreamChunk),
    /// The terminal sentinel
    Done,
    /// Nothing to report (blank data, comments)
    Ignored,
}

/// Parse streaming events from provider-specific format
pub trait StreamEventParser: Send + Sync {
    /// Parse the `data` field of one event
    fn parse_event(&self, data: &str) -> Result<SseFrame, Error>;
}
