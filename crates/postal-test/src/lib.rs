//! Postal Test - Shared test utilities for the postal bus.
//!
//! This crate provides recording sinks, delivery logs and fixture message
//! hierarchies that can be used across postal crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! postal-test.workspace = true
//! ```
//!
//! ```rust
//! use postal_test::{Dog, Mammal, DeliveryLog, test_bus};
//!
//! let (bus, sink) = test_bus();
//! let log = DeliveryLog::new();
//! bus.subscribe(&log.mailbox::<Mammal>("mammals"));
//!
//! bus.publish(Dog::new("rex")).unwrap();
//!
//! assert_eq!(log.mailboxes(), vec!["mammals"]);
//! assert_eq!(sink.returned_count(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod logs;
pub mod mocks;

pub use fixtures::*;
pub use logs::*;
pub use mocks::*;
