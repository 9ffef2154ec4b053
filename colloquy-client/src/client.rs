//! High-level dispatch client

use crate::demux::StreamDemultiplexer;
use crate::observer::StreamObserver;
use colloquy_core::{Completion, Error, Message, Model, Options, Provider, Request, Result};
use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Sends conversations to a provider and collects both response channels
///
/// # Examples
///
/// ```no_run
/// use colloquy_client::Client;
/// use colloquy_core::Message;
/// use colloquy_providers::OpenAI;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OpenAI::with_api_key("your-api-key")?;
/// let client = Client::new(provider, "deepseek-reasoner").with_echo(true);
///
/// let history = vec![Message::user("Why is the sky blue?")];
/// let (answer, reasoning) = client.dispatch(&history, None).await?.into_pair();
/// println!("{answer}\n---\n{reasoning}");
/// # Ok(())
/// # }
/// ```
pub struct Client<P: Provider> {
    provider: P,
    default_model: Model,
    default_options: Options,
    echo: bool,
    cancel: Mutex<CancellationToken>,
}

impl<P: Provider> Client<P> {
    /// Create a new client for `provider`, sending requests to `model`
    pub fn new(provider: P, model: impl Into<Model>) -> Self {
        Self {
            provider,
            default_model: model.into(),
            default_options: Options::default(),
            echo: false,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Set the default model for requests
    pub fn with_model(mut self, model: impl Into<Model>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set default options for requests
    pub fn with_options(mut self, options: Options) -> Self {
        self.default_options = options;
        self
    }

    /// Echo responses to standard output while they stream
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// The default model
    pub fn model(&self) -> &Model {
        &self.default_model
    }

    /// Get a reference to the underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Token that cancels the dispatch currently in flight
    ///
    /// A dispatch ended by cancellation re-arms the client with a fresh
    /// token, so fetch the token again for every dispatch.
    pub fn cancel_token(&self) -> CancellationToken {
        self.token().clone()
    }

    /// Cancel the dispatch currently in flight
    pub fn cancel(&self) {
        self.token().cancel();
    }

    /// Dispatch `history` with the default model and options
    pub async fn dispatch(
        &self,
        history: &[Message],
        observer: Option<&mut dyn StreamObserver>,
    ) -> Result<Completion> {
        self.dispatch_with(
            history,
            self.default_model.clone(),
            self.default_options.clone(),
            observer,
        )
        .await
    }

    /// Dispatch `history` with an explicit model and options
    ///
    /// Local-only roles (`thinking`, `debug`) are dropped before sending.
    /// Options are passed through untouched; streaming is on unless they
    /// set `"stream": false`.
    pub async fn dispatch_with(
        &self,
        history: &[Message],
        model: Model,
        options: Options,
        observer: Option<&mut dyn StreamObserver>,
    ) -> Result<Completion> {
        let request = Request::from_history(model, history, options);
        debug!(
            history = history.len(),
            sent = request.messages.len(),
            "Sanitized conversation"
        );

        let cancel = self.cancel_token();
        let mut demux = if self.echo {
            StreamDemultiplexer::new().with_stdout_echo()
        } else {
            StreamDemultiplexer::new()
        };

        let result = match self.open(request, &cancel).await {
            Ok(stream) => demux.run(stream, observer, &cancel).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(completion) => info!(
                answer_len = completion.answer.len(),
                reasoning_len = completion.reasoning.len(),
                "Dispatch complete"
            ),
            Err(Error::Cancelled) => self.rearm(),
            Err(_) => {}
        }

        result
    }

    async fn open(&self, request: Request, cancel: &CancellationToken) -> Result<P::Stream> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            stream = self.provider.stream(request) => stream,
        }
    }

    fn rearm(&self) {
        let mut token = self.token();
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
    }

    fn token(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancel.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{DispatchEvent, RecordingObserver};
    use mock::MockProvider;
    use colloquy_core::{Role, StreamChunk};
    use pretty_assertions::assert_eq;

    mod mock {
        use super::*;
        use futures::stream::{self, BoxStream, StreamExt};
        use std::sync::{Arc, Mutex};

        /// Replays scripted chunks and records the requests it receives
        #[derive(Clone, Default)]
        pub(super) struct MockProvider {
            pub(super) script: Vec<std::result::Result<StreamChunk, String>>,
            pub(super) requests: Arc<Mutex<Vec<Request>>>,
            pub(super) reject: Option<u16>,
        }

        #[async_trait::async_trait]
        impl Provider for MockProvider {
            type Stream = BoxStream<'static, Result<StreamChunk>>;

            async fn stream(&self, request: Request) -> Result<Self::Stream> {
                self.requests.lock().unwrap().push(request);
                if let Some(status) = self.reject {
                    return Err(Error::http_status(status, "rejected"));
                }
                let items: Vec<Result<StreamChunk>> = self
                    .script
                    .iter()
                    .cloned()
                    .map(|item| item.map_err(Error::transport))
                    .collect();
                Ok(stream::iter(items).boxed())
            }
        }
    }

    fn history() -> Vec<Message> {
        vec![
            Message::system("be brief"),
            Message::user("2+2?"),
            Message::thinking("earlier reasoning"),
            Message::assistant("4"),
            Message::debug("latency 20ms"),
            Message::user("and 3+3?"),
        ]
    }

    #[tokio::test]
    async fn test_dispatch_sanitizes_and_returns_both_channels() {
        let provider = MockProvider {
            script: vec![
                Ok(StreamChunk::reasoning("3+3")),
                Ok(StreamChunk::answer("6")),
            ],
            ..Default::default()
        };
        let requests = provider.requests.clone();
        let client = Client::new(provider, "reasoner").with_options(Options::new().temperature(0.5));

        let completion = client.dispatch(&history(), None).await.unwrap();
        assert_eq!(completion.into_pair(), ("6".into(), "3+3".into()));

        let sent = requests.lock().unwrap();
        let roles: Vec<Role> = sent[0].messages.iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(sent[0].model.as_str(), "reasoner");
        assert!(sent[0].options.get("temperature").is_some());
    }

    #[tokio::test]
    async fn test_dispatch_with_overrides_model_and_options() {
        let provider = MockProvider::default();
        let requests = provider.requests.clone();
        let client = Client::new(provider, "default-model");

        client
            .dispatch_with(
                &history(),
                Model::new("other"),
                Options::new().stream(false),
                None,
            )
            .await
            .unwrap();

        let sent = requests.lock().unwrap();
        assert_eq!(sent[0].model.as_str(), "other");
        assert!(!sent[0].options.is_streaming());
    }

    #[tokio::test]
    async fn test_rejected_request_is_transport_error() {
        let provider = MockProvider {
            reject: Some(401),
            ..Default::default()
        };
        let client = Client::new(provider, "m");
        let mut observer = RecordingObserver::default();

        let err = client
            .dispatch(&history(), Some(&mut observer))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport { status: Some(401), .. }));
        assert!(observer.events.is_empty());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_skips_completion() {
        let provider = MockProvider {
            script: vec![Ok(StreamChunk::answer("par")), Err("reset".into())],
            ..Default::default()
        };
        let client = Client::new(provider, "m");
        let mut observer = RecordingObserver::default();

        let err = client
            .dispatch(&history(), Some(&mut observer))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(observer.events, vec![DispatchEvent::Answer("par".into())]);
    }

    #[tokio::test]
    async fn test_cancel_then_rearm() {
        let provider = MockProvider {
            script: vec![Ok(StreamChunk::answer("ok"))],
            ..Default::default()
        };
        let client = Client::new(provider, "m");

        client.cancel();
        let first = client.dispatch(&history(), None).await;
        assert!(matches!(first, Err(Error::Cancelled)));

        assert!(!client.cancel_token().is_cancelled());
        let second = client.dispatch(&history(), None).await.unwrap();
        assert_eq!(second.answer, "ok");
    }
}
