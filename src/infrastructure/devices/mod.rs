//! Adapters for the physical glasses devices.

pub mod bridge;

pub use bridge::GlassesBridge;
