//! Markdown export

use crate::error::StateResult;
use crate::store::assets::AssetWriter;
use crate::store::{collapsed_summary, role_emoji, role_title, strip_blank_lines, write_atomic, Exporter};
use crate::types::ConversationLog;
use async_trait::async_trait;
use colloquy_core::{Content, ContentPart};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Renders a conversation as a Markdown document
///
/// Reasoning, system prompts and debug notes are folded into `<details>`
/// blocks. Images are written next to the document and linked relatively.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExporter;

impl MarkdownExporter {
    /// Create a new Markdown exporter
    pub fn new() -> Self {
        Self
    }

    async fn render(&self, log: &ConversationLog, path: &Path) -> StateResult<String> {
        let mut assets = AssetWriter::for_document(path);
        let mut out = String::from("# Conversation\n\n");

        for message in log.messages() {
            let _ = write!(
                out,
                "## {} {}\n\n",
                role_emoji(message.role()),
                role_title(message.role())
            );

            match message.content() {
                Content::Text(text) => match collapsed_summary(message.role()) {
                    Some(summary) => {
                        let _ = write!(
                            out,
                            "<details>\n<summary>{}</summary>\n{}\n</details>\n\n",
                            summary,
                            strip_blank_lines(text)
                        );
                    }
                    None => {
                        let _ = write!(out, "{}\n\n", text);
                    }
                },
                Content::Parts(parts) => {
                    for part in parts {
                        match part {
                            ContentPart::Text { text } => {
                                let _ = write!(out, "{}\n\n", text);
                            }
                            ContentPart::Image(image) => {
                                let (_, relative) = assets.write(image).await?;
                                // angle brackets keep stems with spaces a valid link
                                let _ = write!(out, "![attached image](<{}>)\n\n", relative);
                            }
                        }
                    }
                }
            }

            out.push_str("---\n\n");
        }

        Ok(out)
    }
}

#[async_trait]
impl Exporter for MarkdownExporter {
    fn extension(&self) -> &'static str {
        "md"
    }

    async fn export(&self, log: &ConversationLog, path: &Path) -> StateResult<PathBuf> {
        let document = self.render(log, path).await?;
        write_atomic(path, document.as_bytes()).await?;
        info!("Exported Markdown to {:?}", path);
        Ok(path.to_path_buf())
    }
}
