//! Prelude module - commonly used test helpers.

pub use crate::{Animal, Cat, Dog, Left, Mammal, Right, test_bus};
pub use crate::{CapturedLogs, DeliveryLog, RecordingSink};
