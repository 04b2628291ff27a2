use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Examglass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Chat-completion API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Glasses bridge endpoint configuration
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Photo capture options
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Loop timing configuration
    #[serde(default)]
    pub timing: TimingConfig,

    /// Conversation history configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenAI-compatible chat-completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Base URL of the chat-completion endpoint
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// API key; required, validated at load time
    #[serde(default)]
    pub api_key: String,

    /// Model identifier sent with every request
    #[serde(default = "default_api_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.poe.com/v1".to_string()
}

fn default_api_model() -> String {
    "GPT-5.2".to_string()
}

const fn default_api_timeout_secs() -> u64 {
    300
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_key: String::new(),
            model: default_api_model(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// Local glasses bridge service exposing the capture and display devices
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BridgeConfig {
    /// Base URL of the bridge HTTP service
    #[serde(default = "default_bridge_base_url")]
    pub base_url: String,
}

fn default_bridge_base_url() -> String {
    "http://127.0.0.1:8700".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_bridge_base_url(),
        }
    }
}

/// JPEG capture options forwarded to the capture device
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CaptureConfig {
    /// JPEG quality (1-100)
    #[serde(default = "default_capture_quality")]
    pub quality: u8,

    /// Target capture width in pixels
    #[serde(default = "default_capture_width")]
    pub target_width: u32,

    /// Target capture height in pixels
    #[serde(default = "default_capture_height")]
    pub target_height: u32,
}

const fn default_capture_quality() -> u8 {
    90
}

const fn default_capture_width() -> u32 {
    2400
}

const fn default_capture_height() -> u32 {
    1800
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            quality: default_capture_quality(),
            target_width: default_capture_width(),
            target_height: default_capture_height(),
        }
    }
}

/// Delays between rounds and the streaming display throttle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimingConfig {
    /// Delay before the first capture, in seconds
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,

    /// Delay between rounds, in seconds
    #[serde(default = "default_capture_interval_secs")]
    pub capture_interval_secs: u64,

    /// Shorter delay after a model-rejected round, in seconds
    #[serde(default = "default_invalid_retry_delay_secs")]
    pub invalid_retry_delay_secs: u64,

    /// Minimum interval between partial display emissions, in milliseconds
    #[serde(default = "default_stream_min_interval_ms")]
    pub stream_min_interval_ms: u64,
}

const fn default_initial_delay_secs() -> u64 {
    10
}

const fn default_capture_interval_secs() -> u64 {
    15
}

const fn default_invalid_retry_delay_secs() -> u64 {
    5
}

const fn default_stream_min_interval_ms() -> u64 {
    350
}

impl TimingConfig {
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub const fn capture_interval(&self) -> Duration {
        Duration::from_secs(self.capture_interval_secs)
    }

    pub const fn invalid_retry_delay(&self) -> Duration {
        Duration::from_secs(self.invalid_retry_delay_secs)
    }

    pub const fn stream_min_interval(&self) -> Duration {
        Duration::from_millis(self.stream_min_interval_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay_secs(),
            capture_interval_secs: default_capture_interval_secs(),
            invalid_retry_delay_secs: default_invalid_retry_delay_secs(),
            stream_min_interval_ms: default_stream_min_interval_ms(),
        }
    }
}

/// Conversation history bounds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HistoryConfig {
    /// Maximum number of User/Assistant rounds retained
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
}

const fn default_max_rounds() -> usize {
    5
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
