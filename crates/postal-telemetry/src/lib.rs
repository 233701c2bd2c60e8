//! Postal Telemetry - Logging for the postal bus.
//!
//! This crate provides:
//! - Configurable logging setup with multiple formats and targets
//! - [`LogSink`], a dead-letter and failure sink that reports through `tracing`
//! - With the `config` feature, conversion from `postal-config` sections
//!
//! # Example
//!
//! ```rust,no_run
//! use postal_telemetry::{LogConfig, LogFormat, LogSink, setup_logging};
//!
//! # fn main() -> Result<(), postal_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("postal_bus=debug");
//!
//! setup_logging(&config)?;
//!
//! let bus = LogSink::new().with_message(true).into_bus();
//! # let _ = bus;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

#[cfg(feature = "config")]
mod config;
mod error;
mod logging;
mod sink;

#[cfg(feature = "config")]
pub use config::init_from_config;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileRotation, LogConfig, LogFormat, LogTarget, build_subscriber, setup_default_logging,
    setup_logging,
};
pub use sink::{LogSink, parse_level};
