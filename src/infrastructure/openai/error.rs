use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::ports::ChatError;

/// Errors that can occur when talking to the chat-completion API.
#[derive(Error, Debug)]
pub enum ChatApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401/403)
    #[error("invalid API key - authentication failed")]
    InvalidApiKey,

    /// Rate limit exceeded (HTTP 429)
    #[error("rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error (HTTP 5xx)
    #[error("server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// A streamed chunk could not be decoded
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unknown or unexpected status
    #[error("unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl ChatApiError {
    /// Classify a non-success HTTP response.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(body),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::InvalidApiKey,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            status if status.is_server_error() => Self::ServerError(status, body),
            status => Self::UnknownError(status, body),
        }
    }
}

impl From<ChatApiError> for ChatError {
    fn from(err: ChatApiError) -> Self {
        match err {
            ChatApiError::NetworkError(e) => ChatError::Transport(e.to_string()),
            ChatApiError::JsonError(e) => ChatError::Decode(e.to_string()),
            other => ChatError::Api(other.to_string()),
        }
    }
}
