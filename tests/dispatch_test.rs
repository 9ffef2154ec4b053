//! End-to-end dispatch against a mock chat-completions server

use colloquy::client::{ChannelObserver, Client, DispatchEvent};
use colloquy::providers::{OpenAI, OpenAIConfig};
use colloquy::{Error, Message, Options};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn sse(events: &[serde_json::Value]) -> String {
    let mut body: String = events
        .iter()
        .map(|e| format!("data: {}\n\n", e))
        .collect();
    body.push_str("data: [DONE]\n\n");
    body
}

fn client_for(server: &MockServer) -> Client<OpenAI> {
    let config = OpenAIConfig::new("sk-test").with_base_url(format!("{}/v1", server.uri()));
    Client::new(OpenAI::from_config(config).unwrap(), "deepseek-reasoner")
}

fn history() -> Vec<Message> {
    vec![
        Message::system("Think step by step."),
        Message::user("What is 17 * 3?"),
        Message::thinking("old reasoning that must stay local"),
        Message::debug("local note"),
    ]
}

#[tokio::test]
async fn test_streamed_dispatch_splits_channels() {
    let server = MockServer::start().await;
    let body = sse(&[
        json!({"choices": [{"delta": {"role": "assistant", "content": null, "reasoning_content": "17*3 = "}}]}),
        json!({"choices": [{"delta": {"reasoning_content": "51"}}]}),
        json!({"choices": [{"delta": {"content": "", "reasoning_content": null}}]}),
        json!({"choices": [{"delta": {"content": "It is "}}]}),
        json!({"choices": [{"delta": {"content": "51."}, "finish_reason": "stop"}]}),
        json!({"choices": [], "usage": {"total_tokens": 30}}),
    ]);
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"stream": true, "temperature": 0.5})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_options(Options::new().temperature(0.5));
    let (mut observer, mut events) = ChannelObserver::channel();

    let completion = client
        .dispatch(&history(), Some(&mut observer))
        .await
        .unwrap();
    assert_eq!(
        completion.clone().into_pair(),
        ("It is 51.".to_string(), "17*3 = 51".to_string())
    );

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            DispatchEvent::Reasoning("17*3 = ".into()),
            DispatchEvent::Reasoning("51".into()),
            DispatchEvent::Answer("It is ".into()),
            DispatchEvent::Answer("51.".into()),
            DispatchEvent::Complete(completion),
        ]
    );

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let roles: Vec<&str> = sent["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["system", "user"]);
}

#[tokio::test]
async fn test_unauthorized_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let (mut observer, mut events) = ChannelObserver::channel();
    let err = client_for(&server)
        .dispatch(&history(), Some(&mut observer))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { status: Some(401), .. }));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_in_band_error_after_fragments() {
    let server = MockServer::start().await;
    let body = format!(
        "data: {}\n\ndata: {}\n\n",
        json!({"choices": [{"delta": {"content": "partial"}}]}),
        json!({"error": {"message": "upstream overloaded"}})
    );
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let (mut observer, mut events) = ChannelObserver::channel();
    let err = client_for(&server)
        .dispatch(&history(), Some(&mut observer))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("upstream overloaded"));
    assert_eq!(events.try_recv().unwrap(), DispatchEvent::Answer("partial".into()));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_non_streaming_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "51", "reasoning_content": "3*17"}}]
        })))
        .mount(&server)
        .await;

    let completion = client_for(&server)
        .with_options(Options::new().stream(false))
        .dispatch(&history(), None)
        .await
        .unwrap();

    assert_eq!(completion.into_pair(), ("51".to_string(), "3*17".to_string()));
}

#[tokio::test]
async fn test_cancelled_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse(&[json!({"choices": [{"delta": {"content": "x"}}]})]), "text/event-stream")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = client.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        token.cancel();
    });

    let result = client.dispatch(&history(), None).await;
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!client.cancel_token().is_cancelled());
}
