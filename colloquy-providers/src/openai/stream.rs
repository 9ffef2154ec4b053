//! Streaming implementation for OpenAI-compatible endpoints

use crate::http::ResponseStream;
use crate::openai::parser::OpenAIParser;
use crate::traits::{SseFrame, StreamEventParser};
use colloquy_core::{Error, StreamChunk};
use eventsource_stream::{EventStream, Eventsource};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

/// Chunk stream over a server-sent-events body
///
/// Ends after `[DONE]`, after the body closes, or right after yielding the
/// first error.
pub struct OpenAIStream {
    inner: EventStream<ResponseStream>,
    parser: OpenAIParser,
    finished: bool,
}

impl OpenAIStream {
    /// Create a new stream over a raw response body
    pub fn new(body: ResponseStream) -> Self {
        Self {
            inner: body.eventsource(),
            parser: OpenAIParser,
            finished: false,
        }
    }
}

impl Stream for OpenAIStream {
    type Item = Result<StreamChunk, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => match self.parser.parse_event(&event.data) {
                    Ok(SseFrame::Chunk(chunk)) => return Poll::Ready(Some(Ok(chunk))),
                    Ok(SseFrame::Ignored) => continue,
                    Ok(SseFrame::Done) => {
                        debug!("Stream finished with [DONE]");
                        self.finished = true;
                        return Poll::Ready(None);
                    }
                    Err(e) => {
                        self.finished = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(Error::transport(format!(
                        "Event stream error: {}",
                        e
                    )))));
                }
                Poll::Ready(None) => {
                    debug!("Stream body closed");
                    self.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
