//! Configuration struct definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log output settings.
    pub logging: LoggingSection,
    /// How the logging sink reports dead letters and failures.
    pub sinks: SinksSection,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"` or `"json"`.
    pub format: String,
    /// Where logs go: `"stdout"`, `"stderr"` or `"file"`.
    pub target: String,
    /// Log directory, used when `target = "file"`.
    pub directory: String,
    /// Per-crate tracing directives (e.g. `["postal_bus=trace"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            target: "stderr".to_owned(),
            directory: "logs".to_owned(),
            directives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SinksSection
// ---------------------------------------------------------------------------

/// Settings for the tracing-backed dead-letter and failure sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinksSection {
    /// Level at which unmatched messages are logged.
    pub dead_letter_level: String,
    /// Level at which recoverable mailbox failures are logged.
    pub failure_level: String,
    /// Whether to include the message's `Debug` rendering in the log event.
    pub include_message: bool,
}

impl Default for SinksSection {
    fn default() -> Self {
        Self {
            dead_letter_level: "warn".to_owned(),
            failure_level: "error".to_owned(),
            include_message: false,
        }
    }
}
