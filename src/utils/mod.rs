//! Configuration utilities.

/// `novadom.toml` loading and validation.
pub mod toml_config;

pub use toml_config::{ConfigError, NovadomConfig};
