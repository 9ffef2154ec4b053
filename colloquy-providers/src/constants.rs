//! Constants for provider implementations

/// Default OpenAI-compatible base URL
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Path of the chat completions endpoint, relative to the base URL
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Default whole-request timeout in seconds, streaming included
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// SSE payload that terminates an OpenAI stream
pub const SSE_DONE_SENTINEL: &str = "[DONE]";
