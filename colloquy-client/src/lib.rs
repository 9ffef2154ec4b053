//! Dispatch layer for dual-channel conversations
//!
//! [`Client`] sends a conversation to a [`Provider`](colloquy_core::Provider)
//! and drives the resulting stream through a [`StreamDemultiplexer`], which
//! splits it into reasoning and answer text while notifying a
//! [`StreamObserver`] fragment by fragment.

#![warn(missing_docs)]

mod client;
pub mod config;
mod demux;
mod echo;
pub mod input;
mod observer;

pub use client::Client;
pub use config::{read_config, ClientConfig, Settings};
pub use demux::StreamDemultiplexer;
pub use echo::EchoSink;
pub use input::{Attachment, AttachmentKind, Captured, FilePicker, InputCapture, TerminalPicker};
pub use observer::{ChannelObserver, DispatchEvent, FnObserver, StreamObserver};

pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::{Client, StreamDemultiplexer, StreamObserver};
    pub use colloquy_core::{Completion, Message, Role};
}
