//! Conversation persistence for Colloquy
//!
//! This crate owns the [`ConversationLog`] a chat session appends to and the
//! exporters that write it out: lossless JSON that can be loaded back, plus
//! Markdown and HTML documents meant for reading.

pub mod attachment;
pub mod error;
pub mod naming;
pub mod store;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{Exporter, HtmlExporter, JsonStore, MarkdownExporter};
pub use types::ConversationLog;
