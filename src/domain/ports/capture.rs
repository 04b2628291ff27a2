//! Port for the glasses photo capture device.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Options forwarded to the device for one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Target width in pixels
    pub target_width: u32,
    /// Target height in pixels
    pub target_height: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            quality: 90,
            target_width: 2400,
            target_height: 1800,
        }
    }
}

/// A captured photo as delivered by the device.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// Encoded JPEG bytes
    pub jpeg: Vec<u8>,
    /// Capture timestamp
    pub captured_at: DateTime<Utc>,
}

impl CapturedImage {
    pub fn new(jpeg: Vec<u8>) -> Self {
        Self {
            jpeg,
            captured_at: Utc::now(),
        }
    }
}

/// Errors reported by the capture device.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Device unreachable or not ready
    #[error("capture device unavailable: {0}")]
    Unavailable(String),

    /// Device reached but the capture itself failed
    #[error("capture failed: {0}")]
    Failed(String),
}

/// Port trait for the photo capture collaborator.
///
/// Capture failures are recovered locally by the round loop; implementations
/// should return a human-readable reason rather than panic.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Request one photo from the device.
    async fn capture(&self, options: CaptureOptions) -> Result<CapturedImage, CaptureError>;
}
