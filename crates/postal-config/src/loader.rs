//! Config file loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the config file, if one exists
//! 3. Apply `POSTAL_*` env var fallbacks for fields the file left unset
//! 4. Deserialize merged tree → `Config`
//! 5. Validate

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::Path;

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load configuration from `path` layered over the embedded defaults, using
/// the process environment for fallbacks.
///
/// A missing file is not an error; the defaults (plus env fallbacks) apply.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is unreadable, too large or
/// malformed, or if the final configuration fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<Config> {
    load_with_env(path, &collect_env_vars())
}

/// Like [`load`], with an explicit environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is unreadable, too large or
/// malformed, an env var fallback is invalid, or the final configuration
/// fails validation.
pub fn load_with_env<S: BuildHasher>(
    path: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Config> {
    // 1. Parse embedded defaults.
    let mut merged = defaults()?;

    // 2. Config file.
    let file_layer = match path {
        Some(path) => try_load_file(path)?,
        None => None,
    };
    if let Some(overlay) = &file_layer {
        deep_merge(&mut merged, overlay);
        if let Some(path) = path {
            info!(path = %path.display(), "loaded config file");
        }
    }

    // 3. Env var fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, file_layer.as_ref(), env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 4-5. Deserialize and validate.
    finish(merged, "<merged config>")
}

/// Parse a configuration from a TOML string layered over the embedded
/// defaults. No environment fallbacks are applied.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the string is malformed or the resulting
/// configuration fails validation.
pub fn from_toml_str(content: &str) -> ConfigResult<Config> {
    let overlay = parse(content, "<string>")?;
    let mut merged = defaults()?;
    deep_merge(&mut merged, &overlay);
    finish(merged, "<string>")
}

fn defaults() -> ConfigResult<toml::Value> {
    parse(DEFAULTS_TOML, "<embedded defaults>")
}

fn parse(content: &str, path: &str) -> ConfigResult<toml::Value> {
    toml::from_str(content).map_err(|e| ConfigError::Malformed {
        origin: path.to_owned(),
        source: e,
    })
}

fn finish(merged: toml::Value, path: &str) -> ConfigResult<Config> {
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Malformed {
                origin: path.to_owned(),
                source: e,
            })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
///
/// Uses a single read operation (no separate exists/metadata checks before
/// reading).
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            });
        },
    };

    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_CONFIG_FILE_SIZE,
        });
    }

    parse(&content, &path.display().to_string()).map(Some)
}
