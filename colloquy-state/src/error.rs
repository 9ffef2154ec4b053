//! Error types for persistence

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for persistence operations
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while saving, loading or exporting a conversation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StateError {
    /// No saved conversation at this path
    #[error("Conversation not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data is readable but not a valid conversation
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A local attachment could not be read
    #[error("Cannot encode {}: {source}", .path.display())]
    Encoding {
        /// The attachment path
        path: PathBuf,
        /// Underlying read error
        #[source]
        source: io::Error,
    },
}

impl StateError {
    /// Create an invalid data error
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }
}

impl From<StateError> for colloquy_core::Error {
    fn from(err: StateError) -> Self {
        match err {
            StateError::Encoding { .. } => colloquy_core::Error::Encoding {
                message: err.to_string(),
                source: Some(Box::new(err)),
            },
            other => colloquy_core::Error::Persistence {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
