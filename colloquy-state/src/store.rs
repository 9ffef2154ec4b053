//! Writing conversations to disk

use crate::error::StateResult;
use crate::naming;
use crate::types::ConversationLog;
use async_trait::async_trait;
use colloquy_core::Role;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::trace;

mod assets;
mod html;
mod json;
mod markdown;

pub use html::HtmlExporter;
pub use json::JsonStore;
pub use markdown::MarkdownExporter;

/// A format a conversation can be written in
#[async_trait]
pub trait Exporter: Send + Sync {
    /// File extension of the format, without the dot
    fn extension(&self) -> &'static str;

    /// Write `log` to `path` and return the path written
    ///
    /// Missing parent directories are created.
    async fn export(&self, log: &ConversationLog, path: &Path) -> StateResult<PathBuf>;

    /// Write `log` into `dir` as `<stem>.<extension>`
    ///
    /// Exporting several formats with one stem keeps their file names and
    /// `.assets` directories in step.
    async fn export_named(
        &self,
        log: &ConversationLog,
        dir: &Path,
        stem: &str,
    ) -> StateResult<PathBuf> {
        let file_name = format!("{}.{}", stem, self.extension());
        self.export(log, &dir.join(file_name)).await
    }

    /// Write `log` into `dir` under its default name
    async fn export_default(&self, log: &ConversationLog, dir: &Path) -> StateResult<PathBuf> {
        self.export_named(log, dir, &naming::default_stem_now(log))
            .await
    }
}

/// Write `contents` through a temporary sibling file and rename it into place
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> StateResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);
    trace!("Writing {:?} via {:?}", path, temp_path);

    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Emoji shown next to a role in exported documents
pub(crate) fn role_emoji(role: Role) -> &'static str {
    match role {
        Role::System => "⚙️",
        Role::User => "👤",
        Role::Assistant => "🤖",
        Role::Thinking => "📝",
        Role::Debug => "🧰",
    }
}

/// Heading for a role: "assistant" becomes "Assistant"
pub(crate) fn role_title(role: Role) -> String {
    let name = role.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Summary line for roles rendered collapsed
pub(crate) fn collapsed_summary(role: Role) -> Option<&'static str> {
    match role {
        Role::Thinking => Some("View reasoning"),
        Role::System => Some("View system prompt"),
        Role::Debug => Some("View debug info"),
        Role::User | Role::Assistant => None,
    }
}

/// Drop blank lines and surrounding whitespace
pub(crate) fn strip_blank_lines(text: &str) -> String {
    text.trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
