//! Conversions from transport-library errors to core errors

use colloquy_core::Error as CoreError;

/// Convert network errors to core errors
pub fn network_error(error: reqwest::Error) -> CoreError {
    CoreError::Transport {
        message: error.to_string(),
        status: error.status().map(|s| s.as_u16()),
        source: Some(Box::new(error)),
    }
}

/// Convert payload parse errors to core errors
///
/// A payload the endpoint sent but we cannot read is a transport failure from
/// the caller's point of view.
pub fn payload_error(error: serde_json::Error, context: &str) -> CoreError {
    CoreError::Transport {
        message: format!("Failed to parse {}: {}", context, error),
        status: None,
        source: Some(Box::new(error)),
    }
}

/// Pull a human-readable message out of an in-band `error` object
pub fn api_error_message(error: &serde_json::Value) -> String {
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .unwrap_or("the endpoint reported an error")
        .to_string()
}
