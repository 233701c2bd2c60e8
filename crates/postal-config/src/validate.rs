//! Configuration validation rules.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 3] = ["pretty", "compact", "json"];
const VALID_TARGETS: [&str; 3] = ["stdout", "stderr", "file"];

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] naming the first invalid field.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_sinks(config)?;
    Ok(())
}

fn one_of(field: &str, value: &str, allowed: &[&str], what: &str) -> ConfigResult<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::InvalidField {
        field: field.to_owned(),
        message: format!(
            "unsupported {what} '{value}'; expected one of: {}",
            allowed.join(", ")
        ),
    })
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;
    one_of("logging.level", &logging.level, &VALID_LEVELS, "log level")?;
    one_of("logging.format", &logging.format, &VALID_FORMATS, "log format")?;
    one_of("logging.target", &logging.target, &VALID_TARGETS, "log target")?;

    if logging.target == "file" && logging.directory.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field: "logging.directory".to_owned(),
            message: "a directory is required when logging to a file".to_owned(),
        });
    }

    if let Some(blank) = logging.directives.iter().position(|d| d.trim().is_empty()) {
        return Err(ConfigError::InvalidField {
            field: format!("logging.directives[{blank}]"),
            message: "directive must not be empty".to_owned(),
        });
    }

    Ok(())
}

fn validate_sinks(config: &Config) -> ConfigResult<()> {
    let sinks = &config.sinks;
    one_of("sinks.dead_letter_level", &sinks.dead_letter_level, &VALID_LEVELS, "log level")?;
    one_of("sinks.failure_level", &sinks.failure_level, &VALID_LEVELS, "log level")?;
    Ok(())
}
