use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a `postal.toml` could not be turned into a [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but reading it failed.
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is bigger than the loader accepts.
    #[error("{} is {size} bytes, over the {limit} byte limit", .path.display())]
    TooLarge {
        /// Oversized file.
        path: PathBuf,
        /// Size read, in bytes.
        size: u64,
        /// Largest accepted size, in bytes.
        limit: u64,
    },

    /// A layer is not valid TOML or a value has the wrong type.
    ///
    /// `origin` is the file path, `<string>` or `<embedded defaults>`.
    #[error("invalid TOML in {origin}: {source}")]
    Malformed {
        /// Where the layer came from.
        origin: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A field parsed but holds a value postal does not accept.
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        /// Dotted path such as `logging.format`.
        field: String,
        /// What is wrong with the value.
        message: String,
    },

    /// A `POSTAL_*` fallback variable is set to a blank value.
    #[error("environment variable {var_name} is set but empty")]
    BlankEnvVar {
        /// Name of the variable.
        var_name: &'static str,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
