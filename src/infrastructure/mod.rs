//! Infrastructure layer module
//!
//! Adapters for the outside world: the OpenAI-compatible chat API, the
//! glasses companion bridge, and configuration loading. Each adapter
//! satisfies a port trait defined in the domain layer.

pub mod config;
pub mod devices;
pub mod openai;
