//! Hierarchical configuration loading via figment: YAML files, environment
//! overrides, and post-load validation.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
