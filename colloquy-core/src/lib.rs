//! Core traits and types for the Colloquy conversation library
//!
//! This crate provides the fundamental abstractions used throughout the Colloquy
//! workspace: the message model, the dual-channel stream accumulator and the
//! transport-facing `Provider` trait. It performs no I/O of its own.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod provider;
pub mod types;

// Re-export commonly used items
pub use error::{Error, Result};
pub use provider::Provider;
pub use types::{
    message::{Content, ContentPart, Image, Message, Role},
    request::{sanitize, Model, Options, Request, RequestBuilder},
    stream::{Completion, StreamAccumulator, StreamChunk, StreamEvent},
};
