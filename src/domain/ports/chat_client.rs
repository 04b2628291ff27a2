//! Port for the streaming chat-completion service.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::domain::models::Message;

/// Request to the chat-completion service: the model id and the full
/// ordered conversation, system message first.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

/// Errors surfaced by the chat client, before or during streaming.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Missing or invalid client configuration
    #[error("chat client not configured: {0}")]
    Config(String),

    /// Network-level failure (connect, send, mid-stream disconnect)
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("api error: {0}")]
    Api(String),

    /// A fragment could not be decoded
    #[error("stream decode error: {0}")]
    Decode(String),
}

/// Ordered sequence of text fragments terminated by end-of-stream or an
/// error item. No out-of-band reordering is assumed.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Port trait for the streaming chat-completion collaborator.
///
/// The domain depends on this trait only; the reqwest/SSE adapter lives in
/// the infrastructure layer. Implementations must be `Send + Sync` so the
/// executor can hold them behind an `Arc`.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Open a streaming completion for `request` and return the fragment
    /// stream. Errors returned here mean the stream never started; errors
    /// yielded by the stream mean it broke mid-response.
    async fn stream_chat(&self, request: ChatRequest) -> Result<DeltaStream, ChatError>;
}
