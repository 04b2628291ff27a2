pub mod config;
pub mod message;
pub mod round;

pub use config::{
    ApiConfig, BridgeConfig, CaptureConfig, Config, HistoryConfig, LoggingConfig, TimingConfig,
};
pub use message::{ConversationHistory, HistorySnapshot, Message, Role, MAX_ROUNDS};
pub use round::RoundOutcome;
