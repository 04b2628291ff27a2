//! HTTP client for the OpenAI-compatible Chat Completions API.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client as ReqwestClient};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::ChatApiError;
use super::streaming::SseDeltaStream;
use super::types::ChatCompletionRequest;
use crate::domain::models::ApiConfig;
use crate::domain::ports::{ChatClient, ChatError, ChatRequest, DeltaStream};

/// Streaming chat-completion client over reqwest.
///
/// Connection pooling comes from the shared `reqwest::Client`; the bearer
/// token is installed as a default header so every request carries it.
pub struct OpenAiClient {
    http: ReqwestClient,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ChatApiError> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| ChatApiError::InvalidRequest(format!("invalid API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()
            .map_err(ChatApiError::NetworkError)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn stream_chat(&self, request: ChatRequest) -> Result<DeltaStream, ChatError> {
        let wire = ChatCompletionRequest::streaming(&request.model, &request.messages);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, messages = request.messages.len(), "POST {url}");

        let response = self
            .http
            .post(&url)
            .json(&wire)
            .send()
            .await
            .map_err(ChatApiError::NetworkError)
            .map_err(ChatError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            warn!("chat API error ({status}): {body}");
            return Err(ChatApiError::from_status(status, body).into());
        }

        let deltas = SseDeltaStream::new(response.bytes_stream());
        Ok(Box::pin(deltas.map(|item| item.map_err(ChatError::from))))
    }
}
