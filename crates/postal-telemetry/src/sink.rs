//! A dead-letter and failure sink that reports through `tracing`.

use std::str::FromStr;

use postal_bus::{Bus, DeadLetterSink, FailedMessage, FailureSink, ReturnedMessage};
use tracing::Level;

use crate::error::{TelemetryError, TelemetryResult};

/// Emit an event at a level chosen at runtime.
macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {{
        let level: Level = $level;
        if level == Level::ERROR {
            tracing::error!($($rest)+);
        } else if level == Level::WARN {
            tracing::warn!($($rest)+);
        } else if level == Level::INFO {
            tracing::info!($($rest)+);
        } else if level == Level::DEBUG {
            tracing::debug!($($rest)+);
        } else {
            tracing::trace!($($rest)+);
        }
    }};
}

/// Parse a level name such as `"warn"`.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] for an unknown level.
pub fn parse_level(level: &str) -> TelemetryResult<Level> {
    Level::from_str(level)
        .map_err(|_| TelemetryError::ConfigError(format!("unknown log level '{level}'")))
}

/// Sink that logs dead letters and recoverable failures.
///
/// Implements both [`DeadLetterSink`] and [`FailureSink`], so one value can
/// serve a bus in both roles:
///
/// ```rust
/// use postal_telemetry::LogSink;
///
/// let bus = LogSink::default().into_bus();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSink {
    dead_letter_level: Level,
    failure_level: Level,
    include_message: bool,
}

impl Default for LogSink {
    fn default() -> Self {
        Self {
            dead_letter_level: Level::WARN,
            failure_level: Level::ERROR,
            include_message: false,
        }
    }
}

impl LogSink {
    /// Create a sink with the default levels (dead letters `WARN`, failures
    /// `ERROR`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Level for unmatched messages.
    #[must_use]
    pub fn with_dead_letter_level(mut self, level: Level) -> Self {
        self.dead_letter_level = level;
        self
    }

    /// Level for recoverable failures.
    #[must_use]
    pub fn with_failure_level(mut self, level: Level) -> Self {
        self.failure_level = level;
        self
    }

    /// Include the message's `Debug` rendering in every event.
    #[must_use]
    pub fn with_message(mut self, include: bool) -> Self {
        self.include_message = include;
        self
    }

    /// Level used for unmatched messages.
    #[must_use]
    pub fn dead_letter_level(&self) -> Level {
        self.dead_letter_level
    }

    /// Level used for recoverable failures.
    #[must_use]
    pub fn failure_level(&self) -> Level {
        self.failure_level
    }

    /// Whether events carry the message rendering.
    #[must_use]
    pub fn includes_message(&self) -> bool {
        self.include_message
    }

    /// A bus reporting both dead letters and failures to this sink.
    #[must_use]
    pub fn into_bus(self) -> Bus {
        Bus::new(self, self)
    }

    fn render(&self, message: &dyn postal_bus::Message) -> Option<String> {
        self.include_message.then(|| format!("{message:?}"))
    }
}

impl DeadLetterSink for LogSink {
    fn returned(&self, returned: ReturnedMessage) {
        let message = returned.message();
        let payload = self.render(&**message);
        event_at!(
            self.dead_letter_level,
            message_type = %message.type_tag(),
            payload = payload.as_deref(),
            "No mailbox accepted message"
        );
    }
}

impl FailureSink for LogSink {
    fn failed(&self, failed: FailedMessage) {
        let message = failed.message();
        let payload = self.render(&**message);
        event_at!(
            self.failure_level,
            message_type = %message.type_tag(),
            mailbox = %failed.mailbox().name(),
            error = %failed.error(),
            payload = payload.as_deref(),
            "Mailbox failed to handle message"
        );
    }
}
