//! Adapter for OpenAI-compatible chat-completion services.

pub mod client;
pub mod error;
pub mod streaming;
pub mod types;

pub use client::OpenAiClient;
pub use error::ChatApiError;
