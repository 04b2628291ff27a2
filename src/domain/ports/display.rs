//! Port for the glasses text display device.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the display device.
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Device unreachable or refused the update
    #[error("display failed: {0}")]
    Failed(String),
}

/// Port trait for the on-device text display.
#[async_trait]
pub trait DisplayDevice: Send + Sync {
    /// Show `text` on the device.
    ///
    /// `force = true` bypasses any device-side suppression of redundant
    /// updates and is used for persistent-answer commits; throttled status
    /// and partial updates pass `force = false`.
    async fn display(&self, text: &str, force: bool) -> Result<(), DisplayError>;
}
