//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters
//! must implement:
//! - `CaptureDevice`: the glasses camera
//! - `DisplayDevice`: the glasses text display
//! - `ChatClient`: the streaming chat-completion service
//!
//! These traits define the contracts that allow the domain to be independent
//! of specific infrastructure implementations.

pub mod capture;
pub mod chat_client;
pub mod display;

pub use capture::{CaptureDevice, CaptureError, CaptureOptions, CapturedImage};
pub use chat_client::{ChatClient, ChatError, ChatRequest, DeltaStream};
pub use display::{DisplayDevice, DisplayError};
