//! Examglass - Exam solver loop for AI glasses
//!
//! Examglass drives a pair of camera glasses through a periodic loop:
//! capture a photo of the exam sheet, stream it to an OpenAI-compatible
//! chat API, and push the answer to the glasses display as it arrives.
//!
//! # Architecture
//!
//! The crate follows Hexagonal Architecture:
//!
//! - **Domain Layer** (`domain`): conversation history, round outcomes, and
//!   the port traits for capture, display, and chat
//! - **Service Layer** (`services`): stream classification, display
//!   composition, and the round loop itself
//! - **Infrastructure Layer** (`infrastructure`): reqwest adapters for the
//!   chat API and the glasses bridge, plus figment configuration
//! - **CLI Layer** (`cli`): clap commands

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{Config, ConversationHistory, Message, RoundOutcome, MAX_ROUNDS};
pub use domain::ports::{CaptureDevice, ChatClient, ChatRequest, DisplayDevice};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{RoundExecutor, StreamClassifier};
