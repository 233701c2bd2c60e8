//! The bus: construction, subscription and dispatch.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::{debug, trace, warn};

use crate::error::{BusError, BusResult};
use crate::hierarchy::{Lineage, Message, TypeHierarchy};
use crate::mailbox::{Mailbox, MailboxError};
use crate::registry::SubscriptionRegistry;
use crate::sink::{DeadLetterSink, FailedMessage, FailureSink, ReturnedMessage};

struct BusInner {
    registry: SubscriptionRegistry,
    hierarchy: TypeHierarchy,
    dead_letters: Box<dyn DeadLetterSink>,
    failures: Box<dyn FailureSink>,
}

/// In-process publish/subscribe bus dispatching by runtime type.
///
/// A published message reaches every mailbox subscribed to its runtime type
/// or to any ancestor of it. Ancestors are visited from the root down to the
/// runtime type; mailboxes of one type run in subscription order. Everything
/// happens synchronously on the publishing thread.
///
/// Cloning is cheap and yields a handle to the same bus.
///
/// **WARNING:** a mailbox or sink that stores a cloned `Bus` creates an `Arc`
/// cycle and keeps the bus alive forever. Hold a [`WeakBus`] instead.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

impl Bus {
    /// Create a bus reporting to the given sinks.
    pub fn new(
        dead_letters: impl DeadLetterSink + 'static,
        failures: impl FailureSink + 'static,
    ) -> Self {
        Self::from_parts(Box::new(dead_letters), Box::new(failures))
    }

    /// Start building a bus.
    #[must_use]
    pub fn builder() -> BusBuilder {
        BusBuilder::default()
    }

    fn from_parts(dead_letters: Box<dyn DeadLetterSink>, failures: Box<dyn FailureSink>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                registry: SubscriptionRegistry::new(),
                hierarchy: TypeHierarchy::new(),
                dead_letters,
                failures,
            }),
        }
    }

    /// Subscribe `mailbox` to its target type.
    ///
    /// The same mailbox may be subscribed more than once; it is then invoked
    /// once per subscription.
    pub fn subscribe<T: Lineage + ?Sized>(&self, mailbox: &Mailbox<T>) {
        self.inner.registry.subscribe(mailbox.erase());
    }

    /// Remove one subscription of `mailbox`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotSubscribed`] if the mailbox is not subscribed.
    pub fn unsubscribe<T: Lineage + ?Sized>(&self, mailbox: &Mailbox<T>) -> BusResult<()> {
        self.inner.registry.unsubscribe(&mailbox.erase())
    }

    /// Publish a message.
    ///
    /// See [`Bus::publish_shared`].
    ///
    /// # Errors
    ///
    /// Returns [`BusError::DeliveryAborted`] if a mailbox fails fatally.
    pub fn publish<M: Message>(&self, message: M) -> BusResult<()> {
        self.publish_shared(Arc::new(message))
    }

    /// Publish a message that is already shared.
    ///
    /// Every matching mailbox is invoked in turn. A recoverable mailbox
    /// failure is reported to the failure sink and delivery continues. If no
    /// mailbox matched at all, the message goes to the dead-letter sink. A
    /// fatal mailbox failure stops delivery immediately; a panicking mailbox
    /// unwinds straight through this call.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::DeliveryAborted`] if a mailbox fails fatally.
    pub fn publish_shared(&self, message: Arc<dyn Message>) -> BusResult<()> {
        let message_type = message.type_tag();
        let ancestry = self.inner.hierarchy.resolve(&*message);
        let routes = self.inner.registry.entries_for(&ancestry);

        if routes.is_empty() {
            debug!(message_type = %message_type, "No mailbox matched, returning message");
            self.inner
                .dead_letters
                .returned(ReturnedMessage::new(self.clone(), message));
            return Ok(());
        }

        for route in &routes {
            for subscription in route.subscriptions() {
                let mailbox = subscription.mailbox();
                trace!(
                    message_type = %message_type,
                    target = %route.tag(),
                    mailbox = %mailbox.name(),
                    seq = subscription.seq(),
                    "Delivering message"
                );

                match mailbox.deliver(&*message) {
                    Ok(()) => {},
                    Err(MailboxError::Recoverable(source)) => {
                        warn!(
                            message_type = %message_type,
                            mailbox = %mailbox.name(),
                            error = %source,
                            "Mailbox failed, continuing delivery"
                        );
                        self.inner.failures.failed(FailedMessage::new(
                            self.clone(),
                            mailbox.clone(),
                            Arc::clone(&message),
                            Arc::from(source),
                        ));
                    },
                    Err(MailboxError::Fatal(source)) => {
                        warn!(
                            message_type = %message_type,
                            mailbox = %mailbox.name(),
                            error = %source,
                            "Mailbox failed fatally, aborting delivery"
                        );
                        return Err(BusError::DeliveryAborted {
                            mailbox: mailbox.name().to_owned(),
                            message_type: message_type.name(),
                            source,
                        });
                    },
                }
            }
        }

        Ok(())
    }

    /// The subscription registry.
    #[must_use]
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.inner.registry
    }

    /// The ancestor chain resolver.
    #[must_use]
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.inner.hierarchy
    }

    /// Total number of subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Whether both handles refer to the same bus.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Non-owning handle to this bus.
    #[must_use]
    pub fn downgrade(&self) -> WeakBus {
        WeakBus {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("registry", &self.inner.registry)
            .field("hierarchy", &self.inner.hierarchy)
            .finish_non_exhaustive()
    }
}

/// Non-owning bus handle, safe to keep inside mailboxes and sinks.
#[derive(Clone)]
pub struct WeakBus {
    inner: Weak<BusInner>,
}

impl WeakBus {
    /// The bus, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Bus> {
        self.inner.upgrade().map(|inner| Bus { inner })
    }
}

impl fmt::Debug for WeakBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakBus")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Builder for [`Bus`] that checks both sinks are present.
#[derive(Default)]
pub struct BusBuilder {
    dead_letters: Option<Box<dyn DeadLetterSink>>,
    failures: Option<Box<dyn FailureSink>>,
}

impl BusBuilder {
    /// Set the sink for unmatched messages.
    #[must_use]
    pub fn dead_letters(mut self, sink: impl DeadLetterSink + 'static) -> Self {
        self.dead_letters = Some(Box::new(sink));
        self
    }

    /// Set the sink for recoverable mailbox failures.
    #[must_use]
    pub fn failures(mut self, sink: impl FailureSink + 'static) -> Self {
        self.failures = Some(Box::new(sink));
        self
    }

    /// Build the bus.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::MissingSink`] if either sink was not set.
    pub fn build(self) -> BusResult<Bus> {
        let dead_letters = self.dead_letters.ok_or(BusError::MissingSink("dead-letter"))?;
        let failures = self.failures.ok_or(BusError::MissingSink("failure"))?;
        Ok(Bus::from_parts(dead_letters, failures))
    }
}

impl fmt::Debug for BusBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusBuilder")
            .field("has_dead_letters", &self.dead_letters.is_some())
            .field("has_failures", &self.failures.is_some())
            .finish()
    }
}
