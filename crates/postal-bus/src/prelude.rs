//! Prelude module - commonly used types for convenient import.
//!
//! Use `use postal_bus::prelude::*;` to import all essential types.

// Bus
pub use crate::{Bus, BusBuilder, BusError, BusResult, WeakBus};

// Hierarchy
pub use crate::{Lineage, Message, MessageType, TypeTag};

// Mailboxes
pub use crate::{Delivery, Mailbox, MailboxError, MailboxRef};

// Sinks
pub use crate::{DeadLetterSink, FailedMessage, FailureSink, ReturnedMessage};

pub use crate::message_type;
