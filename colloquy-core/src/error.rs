//! Error types for the Colloquy library

use std::error::Error as StdError;
use std::fmt;

/// The main error type for all Colloquy operations
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid settings, unreadable configuration files
    Configuration(String),

    /// Network, HTTP status, authentication or mid-stream failures
    Transport {
        /// Error message
        message: String,
        /// HTTP status code, when the endpoint answered with one
        status: Option<u16>,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// A local attachment could not be read or encoded
    Encoding {
        /// Error message
        message: String,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Saving, loading or exporting a conversation failed
    Persistence {
        /// Error message
        message: String,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    Serialization {
        /// Error message
        message: String,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Message invariants were violated
    Validation(String),

    /// The dispatch was cancelled before the stream finished
    Cancelled,
}

impl Error {
    /// Create a transport error without an underlying source
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Create a transport error carrying an HTTP status
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    /// Whether this error came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Transport {
                message,
                status: Some(status),
                ..
            } => write!(f, "Transport error (HTTP {}): {}", status, message),
            Error::Transport { message, .. } => write!(f, "Transport error: {}", message),
            Error::Encoding { message, .. } => write!(f, "Encoding error: {}", message),
            Error::Persistence { message, .. } => write!(f, "Persistence error: {}", message),
            Error::Serialization { message, .. } => write!(f, "Serialization error: {}", message),
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
            Error::Cancelled => write!(f, "Dispatch cancelled"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Transport { source, .. }
            | Error::Encoding { source, .. }
            | Error::Persistence { source, .. }
            | Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

/// Result type alias for Colloquy operations
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations for error conversions
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport {
            message: err.to_string(),
            status: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
