//! Request conversion for OpenAI-compatible endpoints

use crate::traits::RequestConverter;
use colloquy_core::{Error, Request};
use serde_json::{json, Value};

/// Converts generic requests to the chat-completions body
///
/// Messages already serialize in the chat-completions shape (plain string
/// content, or `text`/`image_url` parts with data URIs), so conversion is a
/// matter of assembling the envelope and overlaying the pass-through options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAIConverter;

impl RequestConverter for OpenAIConverter {
    fn convert_request(&self, request: &Request) -> Result<Value, Error> {
        let messages = request
            .messages
            .iter()
            .filter(|msg| msg.role().is_transportable())
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let mut body = json!({
            "model": request.model.to_string(),
            "messages": messages,
            "stream": true,
        });

        for (key, value) in request.options.iter() {
            body[key.as_str()] = value.clone();
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::{Image, Message, Options};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_basic_request() {
        let request = Request::builder("deepseek-reasoner")
            .message(Message::system("be brief"))
            .message(Message::user("hi"))
            .build();

        let body = OpenAIConverter.convert_request(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "deepseek-reasoner",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn test_options_override_and_extend() {
        let request = Request::builder("qwen3")
            .message(Message::user("hi"))
            .options(
                Options::new()
                    .stream(false)
                    .enable_thinking(true)
                    .temperature(0.5),
            )
            .build();

        let body = OpenAIConverter.convert_request(&request).unwrap();
        assert_eq!(body["stream"], json!(false));
        assert_eq!(body["enable_thinking"], json!(true));
        assert_eq!(body["temperature"], json!(0.5));
    }

    #[test]
    fn test_image_parts_become_data_uris() {
        let request = Request::builder("gpt-4o")
            .message(Message::user_with_image(
                "describe",
                Image::new("image/png", "iVBOR"),
            ))
            .build();

        let body = OpenAIConverter.convert_request(&request).unwrap();
        assert_eq!(
            body["messages"][0]["content"][1],
            json!({"type": "image_url", "image_url": {"url": "data:image/png;base64,iVBOR"}})
        );
    }

    #[test]
    fn test_local_roles_never_reach_the_body() {
        let mut request = Request::builder("m").message(Message::user("q")).build();
        // bypass the builder to check the converter's own guard
        request.messages.push(Message::thinking("secret"));

        let body = OpenAIConverter.convert_request(&request).unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }
}
