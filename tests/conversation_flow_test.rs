//! A multi-turn conversation from first message to saved documents

use async_trait::async_trait;
use colloquy::client::{Client, FnObserver};
use colloquy::state::{ConversationLog, Exporter, HtmlExporter, JsonStore, MarkdownExporter};
use colloquy::{Completion, Error, Message, Provider, Request, Role, StreamChunk};
use futures::stream::{self, BoxStream, StreamExt};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays one scripted response per dispatch and keeps every request
#[derive(Default)]
struct ScriptedProvider {
    turns: Mutex<VecDeque<Vec<StreamChunk>>>,
    seen: Arc<Mutex<Vec<Request>>>,
}

impl ScriptedProvider {
    fn new(turns: Vec<Vec<StreamChunk>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            seen: Arc::default(),
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    type Stream = BoxStream<'static, Result<StreamChunk, Error>>;

    async fn stream(&self, request: Request) -> Result<Self::Stream, Error> {
        self.seen.lock().unwrap().push(request);
        let chunks = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::transport("script exhausted"))?;
        Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

#[tokio::test]
async fn test_two_turns_then_export() {
    let provider = ScriptedProvider::new(vec![
        vec![
            StreamChunk::reasoning("User greets. "),
            StreamChunk::reasoning("Reply kindly."),
            StreamChunk::answer("Hello!"),
        ],
        vec![StreamChunk::answer("Rust is a systems language.")],
    ]);
    let seen = provider.seen.clone();
    let client = Client::new(provider, "reasoner");

    let mut log = ConversationLog::new();
    log.push(Message::system("You are friendly."));

    log.push_text(Role::User, "Hi there");
    let mut streamed = String::new();
    let mut completions = 0;
    {
        let mut observer = FnObserver::new(
            |_: &str| {},
            |fragment: &str| streamed.push_str(fragment),
            |_: &Completion| completions += 1,
        );
        let completion = client
            .dispatch(log.messages(), Some(&mut observer))
            .await
            .unwrap();
        log.record_completion(&completion);
    }
    assert_eq!(streamed, "Hello!");
    assert_eq!(completions, 1);

    log.push(Message::debug("first turn ok"));
    log.push_text(Role::User, "What is Rust?");
    let completion = client.dispatch(log.messages(), None).await.unwrap();
    log.record_completion(&completion);

    let roles: Vec<Role> = log.messages().iter().map(|m| m.role()).collect();
    assert_eq!(
        roles,
        vec![
            Role::System,
            Role::User,
            Role::Thinking,
            Role::Assistant,
            Role::Debug,
            Role::User,
            Role::Assistant,
        ]
    );

    // the second request carried no local annotations
    let second: Vec<Role> = seen.lock().unwrap()[1]
        .messages
        .iter()
        .map(|m| m.role())
        .collect();
    assert_eq!(
        second,
        vec![Role::System, Role::User, Role::Assistant, Role::User]
    );

    let dir = tempfile::tempdir().unwrap();
    let exporters: Vec<Box<dyn Exporter>> = vec![
        Box::new(JsonStore::new()),
        Box::new(MarkdownExporter::new()),
        Box::new(HtmlExporter::new()),
    ];
    let mut written = Vec::new();
    for exporter in &exporters {
        written.push(exporter.export_default(&log, dir.path()).await.unwrap());
    }

    for path in &written {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Hi there_"), "unexpected name {}", name);
    }

    let markdown = std::fs::read_to_string(&written[1]).unwrap();
    assert!(markdown.contains("<summary>View reasoning</summary>\nUser greets. Reply kindly."));
    assert!(markdown.contains("## 🧰 Debug"));

    let html = std::fs::read_to_string(&written[2]).unwrap();
    assert!(html.contains("<p>Rust is a systems language.</p>"));

    let reloaded = JsonStore::new().load(&written[0]).await.unwrap();
    assert_eq!(reloaded.messages(), log.messages());
}

#[tokio::test]
async fn test_failed_dispatch_leaves_log_untouched() {
    let client = Client::new(ScriptedProvider::new(Vec::new()), "reasoner");
    let mut log = ConversationLog::new();
    log.push_text(Role::User, "anyone there?");

    let result = client.dispatch(log.messages(), None).await;
    match result {
        Ok(completion) => log.record_completion(&completion),
        Err(e) => assert!(e.is_transport()),
    }

    assert_eq!(log.len(), 1);
}
