//! Telemetry error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A level, format or filter directive could not be understood.
    #[error("invalid logging configuration: {0}")]
    ConfigError(String),

    /// The subscriber or file appender could not be installed.
    #[error("failed to initialise logging: {0}")]
    InitError(String),

    /// The log directory could not be prepared.
    #[error("log directory {}: {source}", path.display())]
    IoError {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
