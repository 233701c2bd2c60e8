//! Conversion from `postal-config` sections.

use std::path::PathBuf;

use postal_config::{Config, LoggingSection, SinksSection};

use crate::error::{TelemetryError, TelemetryResult};
use crate::logging::{LogConfig, LogTarget};
use crate::sink::{LogSink, parse_level};

impl TryFrom<&LoggingSection> for LogConfig {
    type Error = TelemetryError;

    fn try_from(section: &LoggingSection) -> TelemetryResult<Self> {
        let target = match section.target.as_str() {
            "stdout" => LogTarget::Stdout,
            "stderr" => LogTarget::Stderr,
            "file" => LogTarget::File(PathBuf::from(&section.directory)),
            other => {
                return Err(TelemetryError::ConfigError(format!(
                    "unknown log target '{other}'"
                )));
            },
        };

        let mut config = LogConfig::new(&section.level)
            .with_format(section.format.parse()?)
            .with_target(target);
        if matches!(config.target, LogTarget::File(_)) {
            config = config.without_ansi();
        }
        config.directives.clone_from(&section.directives);
        Ok(config)
    }
}

impl TryFrom<&SinksSection> for LogSink {
    type Error = TelemetryError;

    fn try_from(section: &SinksSection) -> TelemetryResult<Self> {
        Ok(LogSink::new()
            .with_dead_letter_level(parse_level(&section.dead_letter_level)?)
            .with_failure_level(parse_level(&section.failure_level)?)
            .with_message(section.include_message))
    }
}

/// Install logging and build the bus sink from a loaded configuration.
///
/// # Errors
///
/// Returns an error if a section cannot be converted or logging cannot be
/// installed.
pub fn init_from_config(config: &Config) -> TelemetryResult<LogSink> {
    let log_config = LogConfig::try_from(&config.logging)?;
    crate::logging::setup_logging(&log_config)?;
    LogSink::try_from(&config.sinks)
}
