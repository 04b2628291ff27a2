//! Composition of the persistent answer and the transient status line.

use std::sync::Arc;
use tracing::warn;

use crate::domain::ports::DisplayDevice;

/// Owns the last valid answer text and pushes composed screens to the
/// display device.
///
/// The persistent answer only changes through [`stream_answer`]
/// (throttled partial during streaming) or [`commit_answer`] (committed
/// round); status updates are layered underneath it and never overwrite it.
///
/// [`stream_answer`]: Self::stream_answer
/// [`commit_answer`]: Self::commit_answer
pub struct DisplayPresenter {
    device: Arc<dyn DisplayDevice>,
    persistent_answer: String,
}

impl DisplayPresenter {
    pub fn new(device: Arc<dyn DisplayDevice>) -> Self {
        Self {
            device,
            persistent_answer: String::new(),
        }
    }

    /// Last committed or streamed answer text.
    pub fn persistent_answer(&self) -> &str {
        &self.persistent_answer
    }

    /// Compose the full screen text: answer with trailing whitespace
    /// trimmed, status trimmed, joined by a newline when both are present.
    pub fn compose(answer: &str, status: &str) -> String {
        let answer = answer.trim_end();
        let status = status.trim();
        match (answer.is_empty(), status.is_empty()) {
            (true, true) => String::new(),
            (true, false) => status.to_string(),
            (false, true) => answer.to_string(),
            (false, false) => format!("{answer}\n{status}"),
        }
    }

    /// Show a transient status line beneath the persistent answer. Sent only
    /// if the composed text is non-blank; never overwrites the answer.
    pub async fn update_status(&self, status: &str) {
        let text = Self::compose(&self.persistent_answer, status);
        if !text.is_empty() {
            self.send(&text, false).await;
        }
    }

    /// Replace the persistent answer with a throttled partial emission.
    pub async fn stream_answer(&mut self, text: &str) {
        self.persistent_answer = text.to_string();
        self.send(&self.persistent_answer, false).await;
    }

    /// Replace the persistent answer with a committed round's final text and
    /// force a device refresh, bypassing device-side de-duplication.
    pub async fn commit_answer(&mut self, text: &str) {
        self.persistent_answer = text.to_string();
        self.send(&self.persistent_answer, true).await;
    }

    /// Display failures are best-effort: log and carry on.
    async fn send(&self, text: &str, force: bool) {
        if let Err(err) = self.device.display(text, force).await {
            warn!("display update failed: {err}");
        }
    }
}
