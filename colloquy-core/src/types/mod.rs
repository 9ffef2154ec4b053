//! Core types used throughout the Colloquy library

pub mod message;
pub mod request;
pub mod stream;
