//! Lossless JSON storage

use crate::error::{StateError, StateResult};
use crate::store::{write_atomic, Exporter};
use crate::types::ConversationLog;
use async_trait::async_trait;
use colloquy_core::Message;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Saves a conversation as a JSON array of messages and loads it back
///
/// The array uses the chat-completions message shape, images included as
/// data URIs, so a saved file can be fed straight back into a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore;

impl JsonStore {
    /// Create a new JSON store
    pub fn new() -> Self {
        Self
    }

    /// Save `log` to `path`
    pub async fn save(&self, log: &ConversationLog, path: &Path) -> StateResult<()> {
        let json = serde_json::to_string_pretty(log.messages())?;
        write_atomic(path, json.as_bytes()).await?;
        info!("Saved {} messages to {:?}", log.len(), path);
        Ok(())
    }

    /// Load a conversation previously written by [`save`](Self::save)
    pub async fn load(&self, path: &Path) -> StateResult<ConversationLog> {
        let json = match fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StateError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let messages: Vec<Message> = serde_json::from_str(&json)?;
        debug!("Loaded {} messages from {:?}", messages.len(), path);
        Ok(ConversationLog::from_messages(messages))
    }
}

#[async_trait]
impl Exporter for JsonStore {
    fn extension(&self) -> &'static str {
        "json"
    }

    async fn export(&self, log: &ConversationLog, path: &Path) -> StateResult<PathBuf> {
        self.save(log, path).await?;
        Ok(path.to_path_buf())
    }
}
