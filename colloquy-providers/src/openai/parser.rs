//! Response parsing for OpenAI-compatible endpoints

use crate::constants::SSE_DONE_SENTINEL;
use crate::error;
use crate::traits::{ResponseParser, SseFrame, StreamEventParser};
use colloquy_core::{Error, StreamChunk};
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

/// Parses chat-completion payloads into dual-channel chunks
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAIParser;

impl ResponseParser for OpenAIParser {
    fn parse_response(&self, value: Value) -> Result<StreamChunk, Error> {
        if let Some(err) = value.get("error") {
            return Err(Error::transport(error::api_error_message(err)));
        }

        let response: CompletionResponse =
            serde_json::from_value(value).map_err(|e| error::payload_error(e, "completion"))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::transport("No choices in response"))?;

        Ok(StreamChunk {
            reasoning: choice.message.reasoning_content,
            answer: choice.message.content,
        })
    }
}

impl StreamEventParser for OpenAIParser {
    fn parse_event(&self, data: &str) -> Result<SseFrame, Error> {
        let data = data.trim();
        if data.is_empty() {
            return Ok(SseFrame::Ignored);
        }
        if data == SSE_DONE_SENTINEL {
            return Ok(SseFrame::Done);
        }

        let payload: ChunkPayload =
            serde_json::from_str(data).map_err(|e| error::payload_error(e, "stream chunk"))?;

        if let Some(err) = payload.error {
            return Err(Error::transport(format!(
                "Endpoint reported an error mid-stream: {}",
                error::api_error_message(&err)
            )));
        }

        let delta = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.delta)
            .unwrap_or_default();

        trace!(
            reasoning = delta.reasoning_content.is_some(),
            answer = delta.content.is_some(),
            "Parsed stream chunk"
        );

        Ok(SseFrame::Chunk(StreamChunk {
            reasoning: delta.reasoning_content,
            answer: delta.content,
        }))
    }
}

// Response structures
#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    reasoning_content: Option<String>,
}

// Streaming structures
#[derive(Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
    reasoning_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_reasoning_delta() {
        let data = r#"{"id":"c1","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"role":"assistant","content":null,"reasoning_content":"Let me"}}]}"#;
        assert_eq!(
            OpenAIParser.parse_event(data).unwrap(),
            SseFrame::Chunk(StreamChunk::reasoning("Let me"))
        );
    }

    #[test]
    fn test_parse_answer_delta() {
        let data = r#"{"choices":[{"index":0,"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        assert_eq!(
            OpenAIParser.parse_event(data).unwrap(),
            SseFrame::Chunk(StreamChunk::answer("Hello"))
        );
    }

    #[test]
    fn test_parse_empty_choices_is_empty_chunk() {
        let data = r#"{"choices":[],"usage":{"prompt_tokens":3,"completion_tokens":5,"total_tokens":8}}"#;
        assert_eq!(
            OpenAIParser.parse_event(data).unwrap(),
            SseFrame::Chunk(StreamChunk::default())
        );
    }

    #[test]
    fn test_parse_done_and_blank() {
        assert_eq!(OpenAIParser.parse_event("[DONE]").unwrap(), SseFrame::Done);
        assert_eq!(OpenAIParser.parse_event("  ").unwrap(), SseFrame::Ignored);
    }

    #[test]
    fn test_parse_inline_error() {
        let data = r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#;
        let err = OpenAIParser.parse_event(data).unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("Rate limit reached"));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = OpenAIParser.parse_event("{not json").unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_parse_full_response() {
        let value = json!({
            "id": "c2",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "42", "reasoning_content": "6*7"},
                "finish_reason": "stop"
            }]
        });
        let chunk = OpenAIParser.parse_response(value).unwrap();
        assert_eq!(chunk.answer.as_deref(), Some("42"));
        assert_eq!(chunk.reasoning.as_deref(), Some("6*7"));
    }

    #[test]
    fn test_parse_full_response_without_choices() {
        let err = OpenAIParser.parse_response(json!({"choices": []})).unwrap_err();
        assert!(err.is_transport());
    }
}
