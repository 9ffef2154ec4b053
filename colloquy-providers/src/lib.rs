//! Transport implementations for OpenAI-compatible chat endpoints

#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod http;
pub mod traits;

// Provider implementations
pub mod openai;

// Re-export provider types
pub use openai::{OpenAI, OpenAIConfig};

// Re-export common traits
pub use traits::{RequestConverter, ResponseParser, SseFrame, StreamEventParser};
