#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for the postal bus stack.
//!
//! # Usage
//!
//! ```rust,no_run
//! use postal_config::Config;
//!
//! let config = Config::load(Some(std::path::Path::new("postal.toml"))).unwrap();
//! println!("Log level: {}", config.logging.level);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Config file** (`postal.toml`, optional)
//! 2. **Environment variables** (`POSTAL_LOG_LEVEL`, `POSTAL_LOG_FORMAT`) (fallback only)
//! 3. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! # Design
//!
//! This crate has **no dependencies on other internal postal crates**.
//! Conversion into telemetry types happens in `postal-telemetry` behind its
//! `config` feature.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file loading.
pub mod loader;
/// Layered configuration merging.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

// Re-export primary types at the crate root.
pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration from an optional file.
    ///
    /// See [`loader::load`] for the full algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed or the final
    /// configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(path)
    }

    /// Load configuration with an explicit environment instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed, an env var is
    /// invalid, or the final configuration fails validation.
    pub fn load_with_env(
        path: Option<&std::path::Path>,
        env_vars: &std::collections::HashMap<String, String>,
    ) -> ConfigResult<Self> {
        loader::load_with_env(path, env_vars)
    }

    /// Parse configuration from a TOML string over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the string is malformed or fails
    /// validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        loader::from_toml_str(content)
    }
}
