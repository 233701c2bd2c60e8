//! Postal Bus - typed in-process publish/subscribe.
//!
//! This crate provides:
//! - A message type hierarchy declared by composition ([`MessageType`])
//! - Named, identity-carrying handlers ([`Mailbox`])
//! - A concurrent subscription registry
//! - The [`Bus`] dispatcher with dead-letter and failure sinks
//!
//! # Dispatch order
//!
//! A published message reaches every mailbox subscribed to its runtime type
//! or to one of its ancestors. Ancestors are visited from the universal root
//! (`dyn Message`) down to the runtime type, and mailboxes registered against
//! the same type run in subscription order.
//!
//! # Outcomes
//!
//! - No mailbox matched: the message is handed to the [`DeadLetterSink`].
//! - A mailbox returned [`MailboxError::Recoverable`]: the failure is handed
//!   to the [`FailureSink`] and delivery continues.
//! - A mailbox returned [`MailboxError::Fatal`] or panicked: delivery stops
//!   and the error (or panic) reaches the publisher.
//!
//! # Example
//!
//! ```rust
//! use postal_bus::{Bus, FailedMessage, Mailbox, ReturnedMessage, message_type};
//!
//! #[derive(Debug)]
//! struct Order {
//!     id: u64,
//! }
//!
//! #[derive(Debug)]
//! struct RushOrder {
//!     order: Order,
//! }
//!
//! message_type!(Order);
//! message_type!(RushOrder: Order => order);
//!
//! let bus = Bus::new(
//!     |returned: ReturnedMessage| eprintln!("unhandled: {:?}", returned.message()),
//!     |failed: FailedMessage| eprintln!("failed: {}", failed.error()),
//! );
//!
//! let orders = Mailbox::<Order>::from_fn("orders", |order| println!("order {}", order.id));
//! bus.subscribe(&orders);
//!
//! // Delivered to `orders` as an `Order`.
//! bus.publish(RushOrder { order: Order { id: 7 } }).unwrap();
//!
//! bus.unsubscribe(&orders).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod error;
mod hierarchy;
mod mailbox;
mod registry;
mod sink;

pub use bus::{Bus, BusBuilder, WeakBus};
pub use error::{BoxError, BusError, BusResult};
pub use hierarchy::{Lineage, Message, MessageType, TypeHierarchy, TypeTag};
pub use mailbox::{Delivery, Mailbox, MailboxError, MailboxRef};
pub use registry::{Route, Subscription, SubscriptionRegistry};
pub use sink::{DeadLetterSink, FailedMessage, FailureSink, ReturnedMessage};
