//! Bus error types.

use thiserror::Error;

/// Boxed error carried by mailbox failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced to callers of the bus.
///
/// Recoverable delivery failures and dead letters never appear here; they
/// are reported through the sinks the bus was built with.
#[derive(Debug, Error)]
pub enum BusError {
    /// `unsubscribe` was called for a mailbox that is not subscribed to its
    /// target type.
    #[error("mailbox '{mailbox}' is not subscribed to {message_type}")]
    NotSubscribed {
        /// Name of the mailbox.
        mailbox: String,
        /// Type the mailbox targets.
        message_type: &'static str,
    },

    /// A bus was built without one of its mandatory sinks.
    #[error("bus requires a {0} sink")]
    MissingSink(&'static str),

    /// A mailbox raised an unrecoverable error and delivery stopped.
    #[error("mailbox '{mailbox}' aborted delivery of {message_type}: {source}")]
    DeliveryAborted {
        /// Name of the mailbox that failed.
        mailbox: String,
        /// Runtime type of the message being delivered.
        message_type: &'static str,
        /// The error the mailbox returned.
        #[source]
        source: BoxError,
    },
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;
