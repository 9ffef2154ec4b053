//! Dual-channel stream demultiplexing

use crate::echo::EchoSink;
use crate::observer::StreamObserver;
use colloquy_core::{Completion, Error, Result, StreamAccumulator, StreamChunk, StreamEvent};
use futures::{Stream, StreamExt};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Drains a chunk stream into a [`Completion`]
///
/// Each chunk is split into its reasoning and answer fragments. Fragments are
/// appended to their channel, echoed when an echo sink is configured, and
/// handed to the observer before the next chunk is requested.
#[derive(Debug, Default)]
pub struct StreamDemultiplexer {
    echo: Option<EchoSink>,
}

impl StreamDemultiplexer {
    /// Create a demultiplexer without console echo
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo the response into `writer` while it streams
    pub fn with_echo(mut self, writer: impl Write + Send + 'static) -> Self {
        self.echo = Some(EchoSink::new(writer));
        self
    }

    /// Echo the response to standard output
    pub fn with_stdout_echo(mut self) -> Self {
        self.echo = Some(EchoSink::stdout());
        self
    }

    /// Consume `stream` until it ends, fails or `cancel` fires
    ///
    /// On success `on_complete` is called exactly once with the returned
    /// completion. On failure or cancellation it is not called, although
    /// fragment callbacks for chunks received earlier have already run.
    pub async fn run<S>(
        &mut self,
        mut stream: S,
        mut observer: Option<&mut dyn StreamObserver>,
        cancel: &CancellationToken,
    ) -> Result<Completion>
    where
        S: Stream<Item = Result<StreamChunk>> + Unpin,
    {
        let mut accumulator = StreamAccumulator::new();
        let mut chunks = 0usize;

        if let Some(echo) = self.echo.as_mut() {
            echo.header();
        }

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(chunks, "Dispatch cancelled");
                    return Err(Error::Cancelled);
                }
                item = stream.next() => item,
            };

            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    warn!(chunks, "Stream failed: {}", e);
                    return Err(e);
                }
                None => break,
            };

            chunks += 1;
            trace!(chunk = chunks, "Received chunk");

            for event in accumulator.process_chunk(chunk) {
                self.route(event, &mut observer);
            }
        }

        if let Some(echo) = self.echo.as_mut() {
            echo.finish();
        }

        let completion = accumulator.finish();
        debug!(
            chunks,
            answer_len = completion.answer.len(),
            reasoning_len = completion.reasoning.len(),
            "Stream complete"
        );

        if let Some(observer) = observer {
            observer.on_complete(&completion);
        }

        Ok(completion)
    }

    fn route(&mut self, event: StreamEvent, observer: &mut Option<&mut dyn StreamObserver>) {
        match event {
            StreamEvent::ReasoningStarted => {
                if let Some(echo) = self.echo.as_mut() {
                    echo.reasoning_started();
                }
            }
            StreamEvent::AnswerStarted { after_reasoning } => {
                if after_reasoning {
                    if let Some(echo) = self.echo.as_mut() {
                        echo.answer_after_reasoning();
                    }
                }
            }
            StreamEvent::Reasoning(text) => {
                if let Some(echo) = self.echo.as_mut() {
                    echo.fragment(&text);
                }
                if let Some(observer) = observer {
                    observer.on_reasoning(&text);
                }
            }
            StreamEvent::Answer(text) => {
                if let Some(echo) = self.echo.as_mut() {
                    echo.fragment(&text);
                }
                if let Some(observer) = observer {
                    observer.on_answer(&text);
                }
            }
        }
    }
}
