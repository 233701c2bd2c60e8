//! Mailboxes: named, typed message handlers with stable identity.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::error::BoxError;
use crate::hierarchy::{Lineage, Message, TypeTag};

/// Failure returned by a mailbox handler.
///
/// The variant decides what the bus does next: a recoverable failure is
/// handed to the failure sink and delivery continues, a fatal one stops the
/// dispatch and is returned from `publish`.
#[derive(Debug, Error)]
pub enum MailboxError {
    /// Expected failure. Reported to the failure sink.
    #[error("recoverable delivery failure: {0}")]
    Recoverable(#[source] BoxError),

    /// Programming-error class failure. Aborts the dispatch.
    #[error("fatal delivery failure: {0}")]
    Fatal(#[source] BoxError),
}

impl MailboxError {
    /// Wrap an expected failure.
    pub fn recoverable(error: impl Into<BoxError>) -> Self {
        Self::Recoverable(error.into())
    }

    /// Wrap an unrecoverable failure.
    pub fn fatal(error: impl Into<BoxError>) -> Self {
        Self::Fatal(error.into())
    }

    /// Whether this failure aborts the dispatch.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Outcome of one handler invocation.
pub type Delivery = Result<(), MailboxError>;

type Handler = dyn Fn(&dyn Message) -> Delivery + Send + Sync;

struct MailboxCell {
    name: String,
    target: TypeTag,
    handler: Box<Handler>,
}

/// A typed handler that can be subscribed to a bus.
///
/// `T` is the type the mailbox listens for: any [`MessageType`] or
/// `dyn Message` to receive everything. The mailbox also receives every
/// subtype of `T`, viewed as `T`.
///
/// Identity is the shared allocation, not the handler's behaviour: clones
/// are the same mailbox, while two mailboxes built from identical closures
/// are different ones.
///
/// [`MessageType`]: crate::MessageType
pub struct Mailbox<T: ?Sized> {
    cell: Arc<MailboxCell>,
    _target: PhantomData<fn(&T)>,
}

impl<T: Lineage + ?Sized> Mailbox<T> {
    /// Create a mailbox from a fallible handler.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&T) -> Delivery + Send + Sync + 'static,
    {
        let handler = move |message: &dyn Message| match T::narrow(message) {
            Some(view) => handler(view),
            None => Err(MailboxError::fatal(format!(
                "{} is not a {}",
                message.type_tag(),
                T::tag()
            ))),
        };

        Self {
            cell: Arc::new(MailboxCell {
                name: name.into(),
                target: T::tag(),
                handler: Box::new(handler),
            }),
            _target: PhantomData,
        }
    }

    /// Create a mailbox from a handler that cannot fail.
    pub fn from_fn<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self::new(name, move |message: &T| {
            handler(message);
            Ok(())
        })
    }
}

impl<T: ?Sized> Mailbox<T> {
    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.cell.name
    }

    /// Type this mailbox listens for.
    #[must_use]
    pub fn target(&self) -> TypeTag {
        self.cell.target
    }

    /// Whether both handles refer to the same mailbox.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// Type-erased handle to this mailbox.
    #[must_use]
    pub fn erase(&self) -> MailboxRef {
        MailboxRef(Arc::clone(&self.cell))
    }
}

impl<T: ?Sized> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            _target: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("name", &self.cell.name)
            .field("target", &self.cell.target)
            .finish_non_exhaustive()
    }
}

/// Type-erased mailbox handle, as stored by the registry and reported in
/// failure records.
#[derive(Clone)]
pub struct MailboxRef(Arc<MailboxCell>);

impl MailboxRef {
    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Type the mailbox listens for.
    #[must_use]
    pub fn target(&self) -> TypeTag {
        self.0.target
    }

    /// Whether this handle refers to `mailbox`.
    #[must_use]
    pub fn is<T: ?Sized>(&self, mailbox: &Mailbox<T>) -> bool {
        Arc::ptr_eq(&self.0, &mailbox.cell)
    }

    /// Whether both handles refer to the same mailbox.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn deliver(&self, message: &dyn Message) -> Delivery {
        (self.0.handler)(message)
    }
}

impl fmt::Debug for MailboxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxRef")
            .field("name", &self.0.name)
            .field("target", &self.0.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_type;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Ping {
        seq: usize,
    }

    #[derive(Debug)]
    struct Loud {
        ping: Ping,
    }

    #[derive(Debug)]
    struct Pong;

    message_type!(Ping);
    message_type!(Loud: Ping => ping);
    message_type!(Pong);

    #[test]
    fn test_mailbox_targets_its_type() {
        let mailbox = Mailbox::<Ping>::from_fn("pings", |_| {});
        assert_eq!(mailbox.target(), TypeTag::of::<Ping>());
        assert_eq!(mailbox.name(), "pings");

        let root = Mailbox::<dyn Message>::from_fn("all", |_| {});
        assert!(root.target().is_root());
    }

    #[test]
    fn test_clone_shares_identity() {
        let a = Mailbox::<Ping>::from_fn("a", |_| {});
        let b = a.clone();
        let c = Mailbox::<Ping>::from_fn("a", |_| {});

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert!(a.erase().is(&b));
        assert!(a.erase().ptr_eq(&b.erase()));
        assert!(!a.erase().is(&c));
    }

    #[test]
    fn test_deliver_views_subtype_as_target() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        let mailbox = Mailbox::<Ping>::from_fn("pings", move |ping| {
            seen_clone.store(ping.seq, Ordering::SeqCst);
        });

        let loud = Loud {
            ping: Ping { seq: 7 },
        };
        mailbox.erase().deliver(&loud).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_deliver_unrelated_type_is_fatal() {
        let mailbox = Mailbox::<Ping>::from_fn("pings", |_| {});
        let err = mailbox.erase().deliver(&Pong).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_handler_error_passes_through() {
        let mailbox = Mailbox::<Ping>::new("flaky", |_| Err(MailboxError::recoverable("busy")));
        let err = mailbox.erase().deliver(&Ping { seq: 1 }).unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "recoverable delivery failure: busy");
    }
}
