//! Implementation of the `examglass solve` command.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::ports::{CaptureDevice, ChatClient, DisplayDevice};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::devices::GlassesBridge;
use crate::infrastructure::openai::OpenAiClient;
use crate::services::RoundExecutor;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let chat: Arc<dyn ChatClient> =
        Arc::new(OpenAiClient::new(&config.api).context("Failed to build chat client")?);
    let bridge =
        Arc::new(GlassesBridge::new(&config.bridge).context("Failed to build bridge client")?);
    let capture: Arc<dyn CaptureDevice> = bridge.clone();
    let display: Arc<dyn DisplayDevice> = bridge;

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after the current round");
            ctrl_c_cancel.cancel();
        }
    });

    let mut executor = RoundExecutor::new(capture, chat, display, config, cancel);
    executor.run().await;
    Ok(())
}
