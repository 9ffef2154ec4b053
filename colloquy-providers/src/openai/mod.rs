//! OpenAI-compatible provider implementation

mod config;
mod converter;
mod parser;
mod provider;
mod stream;

pub use config::OpenAIConfig;
pub use converter::OpenAIConverter;
pub use parser::OpenAIParser;
pub use provider::{ChunkStream, OpenAI};
pub use stream::OpenAIStream;
