//! HTTP adapter for the glasses companion bridge.
//!
//! The bridge is a local daemon that owns the Bluetooth link to the glasses
//! and exposes capture and display over plain HTTP.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::models::BridgeConfig;
use crate::domain::ports::{
    CaptureDevice, CaptureError, CaptureOptions, CapturedImage, DisplayDevice, DisplayError,
};

#[derive(Serialize)]
struct CaptureRequest {
    quality: u8,
    target_width: u32,
    target_height: u32,
}

#[derive(Serialize)]
struct DisplayRequest<'a> {
    text: &'a str,
    force: bool,
}

/// Client for both device ports, backed by one pooled HTTP client.
pub struct GlassesBridge {
    http: ReqwestClient,
    base_url: String,
}

impl GlassesBridge {
    pub fn new(config: &BridgeConfig) -> Result<Self, DisplayError> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DisplayError::Failed(format!("bridge client init: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CaptureDevice for GlassesBridge {
    async fn capture(&self, options: CaptureOptions) -> Result<CapturedImage, CaptureError> {
        let url = format!("{}/capture", self.base_url);
        let request = CaptureRequest {
            quality: options.quality,
            target_width: options.target_width,
            target_height: options.target_height,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CaptureError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CaptureError::Failed(format!("{status}: {body}")));
        }

        let jpeg = response
            .bytes()
            .await
            .map_err(|e| CaptureError::Failed(e.to_string()))?;
        if jpeg.is_empty() {
            return Err(CaptureError::Failed("empty capture body".to_string()));
        }

        debug!(bytes = jpeg.len(), "captured photo");
        Ok(CapturedImage::new(jpeg.to_vec()))
    }
}

#[async_trait]
impl DisplayDevice for GlassesBridge {
    async fn display(&self, text: &str, force: bool) -> Result<(), DisplayError> {
        let url = format!("{}/display", self.base_url);
        let request = DisplayRequest { text, force };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DisplayError::Failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DisplayError::Failed(format!("{status}: {body}")));
        }

        Ok(())
    }
}
