//! Colloquy - streaming conversations with reasoning models
//!
//! Some chat-completion endpoints stream a model's reasoning on a channel of
//! its own, next to the answer. This crate sends a conversation, splits the
//! stream into both channels as it arrives, and keeps a log of the whole
//! exchange that can be saved as JSON, Markdown or HTML.
//!
//! # Features
//!
//! - **Dual-channel streaming**: reasoning and answer are delivered to an
//!   observer fragment by fragment and returned in full at the end
//! - **Cancellation**: a dispatch in flight stops cleanly at the next chunk
//! - **Local annotations**: `thinking` and `debug` messages stay in the log
//!   and are never sent to the endpoint
//! - **Export**: lossless JSON plus readable Markdown and HTML documents
//!
//! # Quick Start
//!
//! ```no_run
//! # use colloquy::prelude::*;
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), colloquy::Error> {
//! #     #[cfg(all(feature = "client", feature = "state"))]
//! #     {
//!     let provider = OpenAI::from_config(
//!         OpenAIConfig::new("your-api-key").with_base_url("https://api.deepseek.com/v1"),
//!     )?;
//!     let client = Client::new(provider, "deepseek-reasoner").with_echo(true);
//!
//!     let mut log = ConversationLog::new();
//!     log.push(Message::user("Is 2^31 - 1 prime?"));
//!
//!     let completion = client.dispatch(log.messages(), None).await?;
//!     log.record_completion(&completion);
//! #     }
//! #     Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export core types
pub use colloquy_core::*;

#[cfg(feature = "providers")]
#[cfg_attr(docsrs, doc(cfg(feature = "providers")))]
pub mod providers {
    //! Transport implementations
    pub use colloquy_providers::*;
}

#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client {
    //! Dispatch client, stream demultiplexer and observers
    pub use colloquy_client::*;
}

#[cfg(feature = "state")]
#[cfg_attr(docsrs, doc(cfg(feature = "state")))]
pub mod state {
    //! Conversation log and exporters
    pub use colloquy_state::*;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use colloquy_core::{
        Completion, Content, Error, Message, Model, Options, Provider, Request, Role,
        StreamChunk,
    };

    #[cfg(feature = "providers")]
    pub use colloquy_providers::{OpenAI, OpenAIConfig};

    #[cfg(feature = "client")]
    pub use colloquy_client::{Client, FnObserver, StreamDemultiplexer, StreamObserver};

    #[cfg(feature = "state")]
    pub use colloquy_state::{ConversationLog, Exporter};
}
