//! Styled HTML export

use crate::error::StateResult;
use crate::store::assets::AssetWriter;
use crate::store::{collapsed_summary, role_emoji, role_title, strip_blank_lines, write_atomic, Exporter};
use crate::types::ConversationLog;
use async_trait::async_trait;
use colloquy_core::{Content, ContentPart, Message};
use pulldown_cmark::{html, Event, Options, Parser};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Conversation</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, "Noto Sans", sans-serif, "Apple Color Emoji", "Segoe UI Emoji", "Noto Color Emoji";
            background-color: #f0f2f5;
            color: #333;
            margin: 0;
            padding: 20px;
        }
        .chat-container {
            max-width: 800px;
            margin: 0 auto;
            background-color: #ffffff;
            border-radius: 12px;
            box-shadow: 0 4px 12px rgba(0, 0, 0, 0.1);
            overflow: hidden;
        }
        .chat-header {
            background-color: #0d6efd;
            color: white;
            padding: 20px;
            text-align: center;
            font-size: 1.5em;
            font-weight: bold;
        }
        .chat-body { padding: 20px; }
        .message { display: flex; margin-bottom: 20px; align-items: flex-start; }
        .message.user { justify-content: flex-end; }
        .message.assistant { justify-content: flex-start; }
        .message.details-wrapper { justify-content: center; }
        .avatar {
            width: 40px;
            height: 40px;
            border-radius: 50%;
            display: flex;
            align-items: center;
            justify-content: center;
            font-size: 1.8em;
            flex-shrink: 0;
        }
        .message.user .avatar { order: 2; margin-left: 12px; background-color: #0d6efd; }
        .message.assistant .avatar { order: 1; margin-right: 12px; background-color: #198754; }
        .content { max-width: 70%; padding: 12px 18px; border-radius: 18px; position: relative; }
        .message.user .content { background-color: #e7f0ff; border-top-right-radius: 4px; order: 1; }
        .message.assistant .content { background-color: #f1f1f1; border-top-left-radius: 4px; order: 2; }
        .content p { margin: 0; line-height: 1.6; }
        .content table { border-collapse: collapse; margin: 8px 0; }
        .content th, .content td { border: 1px solid #d0d0d0; padding: 4px 8px; }
        .content img.attached-image { max-width: 100%; border-radius: 8px; margin-top: 10px; }
        .content pre {
            background-color: #282c34;
            color: #abb2bf;
            padding: 1em;
            border-radius: 8px;
            overflow-x: auto;
            font-family: "Fira Code", "Courier New", monospace;
            font-size: 0.9em;
        }
        .content code { font-family: "Fira Code", "Courier New", monospace; }
        .content :not(pre) > code {
            background-color: #e9eaec;
            color: #c7254e;
            padding: 2px 4px;
            border-radius: 4px;
            font-size: 0.9em;
        }
        .details-box {
            margin: 10px 0;
            border: 1px solid #e0e0e0;
            border-radius: 8px;
            background-color: #fafafa;
            width: 100%;
        }
        .details-box summary {
            cursor: pointer;
            padding: 12px;
            font-weight: bold;
            outline: none;
            list-style: none;
        }
        .details-box summary::-webkit-details-marker { display: none; }
        .details-box summary::before { content: '▶'; margin-right: 8px; font-size: 0.8em; color: #666; }
        .details-box[open] > summary::before { content: '▼'; }
        .details-box-content {
            padding: 0 15px 15px;
            white-space: pre-wrap;
            word-wrap: break-word;
            font-size: 0.9em;
            color: #555;
            background-color: #fff;
            border-top: 1px solid #e0e0e0;
        }
        .details-box-content pre {
            background-color: #fdfdfd;
            color: #333;
            padding: 1em;
            border-radius: 8px;
            border: 1px solid #eee;
            overflow-x: auto;
            font-family: "Courier New", monospace;
        }
        .role-name { font-weight: bold; margin-bottom: 5px; font-size: 0.9em; color: #666; }
    </style>
</head>
<body>
    <div class="chat-container">
        <div class="chat-header">Conversation</div>
        <div class="chat-body">
"#;

const PAGE_TAIL: &str = r#"        </div>
    </div>
</body>
</html>
"#;

/// Renders a conversation as a self-contained, styled HTML page
///
/// User and assistant turns become chat bubbles with their Markdown
/// rendered; system prompts, reasoning and debug notes become collapsible
/// boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExporter;

impl HtmlExporter {
    /// Create a new HTML exporter
    pub fn new() -> Self {
        Self
    }

    async fn render(&self, log: &ConversationLog, path: &Path) -> StateResult<String> {
        let mut assets = AssetWriter::for_document(path);
        let mut out = String::from(PAGE_HEAD);

        for message in log.messages() {
            match collapsed_summary(message.role()) {
                Some(summary) => render_details(&mut out, message, summary),
                None => render_bubble(&mut out, message, &mut assets).await?,
            }
            out.push('\n');
        }

        out.push_str(PAGE_TAIL);
        Ok(out)
    }
}

fn render_details(out: &mut String, message: &Message, summary: &str) {
    let text = match message.content() {
        Content::Text(text) => text.clone(),
        Content::Parts(parts) => parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };

    let _ = write!(
        out,
        r#"<div class="message details-wrapper"><details class="details-box"><summary>{} {}</summary><div class="details-box-content"><pre>{}</pre></div></details></div>"#,
        role_emoji(message.role()),
        summary,
        escape_html(&strip_blank_lines(&text))
    );
}

async fn render_bubble(
    out: &mut String,
    message: &Message,
    assets: &mut AssetWriter,
) -> StateResult<()> {
    let _ = write!(
        out,
        r#"<div class="message {}"><div class="avatar">{}</div><div class="content"><div class="role-name">{}</div>"#,
        message.role(),
        role_emoji(message.role()),
        role_title(message.role())
    );

    match message.content() {
        Content::Text(text) => out.push_str(&markdown_to_html(text)),
        Content::Parts(parts) => {
            for part in parts {
                match part {
                    ContentPart::Text { text } => out.push_str(&markdown_to_html(text)),
                    ContentPart::Image(image) => {
                        let (index, relative) = assets.write(image).await?;
                        let _ = write!(
                            out,
                            r#"<img src="{}" alt="attached image {}" class="attached-image">"#,
                            escape_html(&relative),
                            index
                        );
                    }
                }
            }
        }
    }

    out.push_str("</div></div>");
    Ok(())
}

fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // raw HTML in messages is shown as text, never injected into the page
    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut html_out = String::new();
    html::push_html(&mut html_out, events);
    html_out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
impl Exporter for HtmlExporter {
    fn extension(&self) -> &'static str {
        "html"
    }

    async fn export(&self, log: &ConversationLog, path: &Path) -> StateResult<PathBuf> {
        let document = self.render(log, path).await?;
        write_atomic(path, document.as_bytes()).await?;
        info!("Exported HTML to {:?}", path);
        Ok(path.to_path_buf())
    }
}
