//! OpenAI-compatible provider implementation
//!
//! Works against any endpoint that speaks the chat-completions protocol,
//! including those that stream a separate `reasoning_content` delta.

use crate::http::{create_headers, HttpClient, ReqwestClient};
use crate::openai::{
    config::OpenAIConfig, converter::OpenAIConverter, parser::OpenAIParser, stream::OpenAIStream,
};
use crate::traits::{RequestConverter, ResponseParser};
use async_trait::async_trait;
use colloquy_core::{Error, Provider, Request, StreamChunk};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info};

/// Boxed chunk stream returned by [`OpenAI`]
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, Error>> + Send>>;

/// Provider for OpenAI-compatible chat completions
///
/// # Example
///
/// ```no_run
/// use colloquy_providers::{OpenAI, OpenAIConfig};
///
/// # fn example() -> Result<(), colloquy_core::Error> {
/// let config = OpenAIConfig::new("your-api-key")
///     .with_base_url("https://api.deepseek.com/v1");
/// let provider = OpenAI::from_config(config)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpenAI {
    client: Arc<dyn HttpClient>,
    config: OpenAIConfig,
    converter: OpenAIConverter,
    parser: OpenAIParser,
}

impl OpenAI {
    /// Create a new provider with the given configuration and client
    pub fn new(config: OpenAIConfig, client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            config,
            converter: OpenAIConverter,
            parser: OpenAIParser,
        }
    }

    /// Create a provider with the default reqwest client
    ///
    /// Fails with a configuration error when the API key is empty.
    pub fn from_config(config: OpenAIConfig) -> Result<Self, Error> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Configuration("API key must not be empty".to_string()));
        }
        let client = Arc::new(ReqwestClient::with_timeout(config.timeout)?);
        Ok(Self::new(config, client))
    }

    /// Create a provider for the public OpenAI endpoint
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::from_config(OpenAIConfig::new(api_key))
    }

    /// The configuration in use
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Stream = ChunkStream;

    async fn stream(&self, request: Request) -> Result<Self::Stream, Error> {
        let streaming = request.options.is_streaming();
        let body = self.converter.convert_request(&request)?;
        let headers = create_headers(&self.config.api_key, None)?;
        let url = self.config.chat_url();

        info!(
            model = %request.model,
            messages = request.messages.len(),
            streaming,
            "Opening chat completion"
        );

        if streaming {
            let bytes = self.client.post_stream(&url, headers, body).await?;
            Ok(Box::pin(OpenAIStream::new(bytes)))
        } else {
            let value = self.client.post(&url, headers, body).await?;
            let chunk = self.parser.parse_response(value)?;
            debug!("Received non-streamed completion");
            Ok(Box::pin(futures::stream::once(async move { Ok(chunk) })))
        }
    }
}
