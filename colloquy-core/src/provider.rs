//! Core provider trait for streaming chat completions

use crate::error::Result;
use crate::types::request::Request;
use crate::types::stream::StreamChunk;
use async_trait::async_trait;

/// The transport seam between a conversation and a remote endpoint
///
/// A provider opens one streaming chat completion per call. Request-level
/// failures (authentication, malformed content, network) are returned from
/// `stream` itself; failures after the stream is open surface as `Err` items.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The stream type returned by this provider
    type Stream: futures_core::Stream<Item = Result<StreamChunk>> + Send + Unpin;

    /// Submit a request and get the stream of chunks back
    async fn stream(&self, request: Request) -> Result<Self::Stream>;
}
