//! Parsing and validation of `shaderbin.toml` configuration files.
//!
//! This crate reads the configuration file into a strongly-typed
//! [`ShaderbinConfig`] and resolves where the cache lives from the
//! configuration and the environment.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_cache, resolve_cache_from_env, ResolvedCache};
pub use types::*;
