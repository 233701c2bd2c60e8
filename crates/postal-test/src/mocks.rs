//! Recording sinks and delivery logs.

use std::sync::{Arc, Mutex};

use postal_bus::{
    DeadLetterSink, FailedMessage, FailureSink, Lineage, Mailbox, MailboxError, ReturnedMessage,
    TypeTag,
};

/// Sink that records every returned and failed message.
///
/// Clones share the same recording, so one clone can be handed to the bus as
/// both sinks while the test keeps another.
///
/// Records hold the bus, so a bus wired to a `RecordingSink` that has
/// captured anything is never freed. Acceptable in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    returned: Arc<Mutex<Vec<ReturnedMessage>>>,
    failed: Arc<Mutex<Vec<FailedMessage>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All returned messages, oldest first.
    #[must_use]
    pub fn returned_messages(&self) -> Vec<ReturnedMessage> {
        self.returned
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// All failed deliveries, oldest first.
    #[must_use]
    pub fn failed_messages(&self) -> Vec<FailedMessage> {
        self.failed
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of returned messages.
    #[must_use]
    pub fn returned_count(&self) -> usize {
        self.returned.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Number of failed deliveries.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.returned.lock() {
            guard.clear();
        }
        if let Ok(mut guard) = self.failed.lock() {
            guard.clear();
        }
    }
}

impl DeadLetterSink for RecordingSink {
    fn returned(&self, message: ReturnedMessage) {
        if let Ok(mut guard) = self.returned.lock() {
            guard.push(message);
        }
    }
}

impl FailureSink for RecordingSink {
    fn failed(&self, message: FailedMessage) {
        if let Ok(mut guard) = self.failed.lock() {
            guard.push(message);
        }
    }
}

/// One delivery seen by a [`DeliveryLog`] mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    /// Name of the mailbox that received the message.
    pub mailbox: String,
    /// Type the mailbox listens for.
    pub target: TypeTag,
    /// `Debug` rendering of the message as the mailbox saw it.
    pub rendered: String,
}

/// Ordered record of which mailbox saw which message, shared by every
/// mailbox it creates.
#[derive(Debug, Clone, Default)]
pub struct DeliveryLog {
    entries: Arc<Mutex<Vec<DeliveryRecord>>>,
}

impl DeliveryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailbox targeting `T` that appends to this log and succeeds.
    #[must_use]
    pub fn mailbox<T: Lineage + ?Sized>(&self, name: &str) -> Mailbox<T> {
        self.mailbox_with(name, |_| Ok(()))
    }

    /// A mailbox targeting `T` that appends to this log, then returns
    /// whatever `outcome` returns.
    #[must_use]
    pub fn mailbox_with<T, F>(&self, name: &str, outcome: F) -> Mailbox<T>
    where
        T: Lineage + ?Sized,
        F: Fn(&T) -> Result<(), MailboxError> + Send + Sync + 'static,
    {
        let log = self.clone();
        let label = name.to_owned();
        Mailbox::new(name, move |message: &T| {
            log.push(DeliveryRecord {
                mailbox: label.clone(),
                target: T::tag(),
                rendered: format!("{message:?}"),
            });
            outcome(message)
        })
    }

    fn push(&self, record: DeliveryRecord) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(record);
        }
    }

    /// All recorded deliveries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<DeliveryRecord> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Mailbox names in delivery order.
    #[must_use]
    pub fn mailboxes(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.mailbox).collect()
    }

    /// Number of deliveries made to `mailbox`.
    #[must_use]
    pub fn count_for(&self, mailbox: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.mailbox == mailbox)
            .count()
    }

    /// Number of recorded deliveries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Whether nothing was delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
