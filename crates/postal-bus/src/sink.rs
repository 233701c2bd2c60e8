//! Dead-letter and failure sinks, and the records handed to them.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::bus::Bus;
use crate::hierarchy::Message;
use crate::mailbox::MailboxRef;

/// A published message that matched no subscription.
#[derive(Clone)]
pub struct ReturnedMessage {
    bus: Bus,
    message: Arc<dyn Message>,
}

impl ReturnedMessage {
    pub(crate) fn new(bus: Bus, message: Arc<dyn Message>) -> Self {
        Self { bus, message }
    }

    /// The bus the message was published on.
    #[must_use]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The undelivered message.
    #[must_use]
    pub fn message(&self) -> &Arc<dyn Message> {
        &self.message
    }
}

impl fmt::Debug for ReturnedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnedMessage")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// A delivery that a mailbox rejected with a recoverable error.
#[derive(Clone)]
pub struct FailedMessage {
    bus: Bus,
    mailbox: MailboxRef,
    message: Arc<dyn Message>,
    error: Arc<dyn Error + Send + Sync>,
}

impl FailedMessage {
    pub(crate) fn new(
        bus: Bus,
        mailbox: MailboxRef,
        message: Arc<dyn Message>,
        error: Arc<dyn Error + Send + Sync>,
    ) -> Self {
        Self {
            bus,
            mailbox,
            message,
            error,
        }
    }

    /// The bus the message was published on.
    #[must_use]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The mailbox that failed.
    #[must_use]
    pub fn mailbox(&self) -> &MailboxRef {
        &self.mailbox
    }

    /// The message being delivered.
    #[must_use]
    pub fn message(&self) -> &Arc<dyn Message> {
        &self.message
    }

    /// The error the mailbox returned.
    #[must_use]
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.error
    }
}

impl fmt::Debug for FailedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailedMessage")
            .field("mailbox", &self.mailbox)
            .field("message", &self.message)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Receives messages that matched no subscription.
///
/// Called synchronously on the publishing thread, possibly from several
/// threads at once.
pub trait DeadLetterSink: Send + Sync {
    /// Handle one returned message.
    fn returned(&self, message: ReturnedMessage);
}

/// Receives recoverable mailbox failures.
///
/// Called synchronously on the publishing thread, once per failing mailbox,
/// possibly from several threads at once.
pub trait FailureSink: Send + Sync {
    /// Handle one failed delivery.
    fn failed(&self, message: FailedMessage);
}

impl<F> DeadLetterSink for F
where
    F: Fn(ReturnedMessage) + Send + Sync,
{
    fn returned(&self, message: ReturnedMessage) {
        self(message);
    }
}

impl<F> FailureSink for F
where
    F: Fn(FailedMessage) + Send + Sync,
{
    fn failed(&self, message: FailedMessage) {
        self(message);
    }
}
