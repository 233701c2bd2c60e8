//! Fixture message hierarchies.
//!
//! ```text
//! dyn Message
//! ├── Animal
//! │   └── Mammal
//! │       ├── Dog
//! │       └── Cat
//! ├── Left
//! └── Right
//! ```

use postal_bus::{Bus, message_type};

use crate::mocks::RecordingSink;

/// Base of the animal hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animal {
    /// Name of the animal.
    pub name: String,
}

/// Interposed base between [`Animal`] and the concrete animals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mammal {
    /// Parent view.
    pub animal: Animal,
    /// Number of legs.
    pub legs: u8,
}

/// Leaf type under [`Mammal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dog {
    /// Parent view.
    pub mammal: Mammal,
    /// Whether the dog is a good dog.
    pub good: bool,
}

/// Second leaf type under [`Mammal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cat {
    /// Parent view.
    pub mammal: Mammal,
    /// Whether the cat stays indoors.
    pub indoor: bool,
}

/// Top-level type unrelated to [`Right`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Left(pub u32);

/// Top-level type unrelated to [`Left`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Right(pub u32);

message_type!(Animal);
message_type!(Mammal: Animal => animal);
message_type!(Dog: Mammal => mammal);
message_type!(Cat: Mammal => mammal);
message_type!(Left);
message_type!(Right);

impl Animal {
    /// An animal with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Mammal {
    /// A four-legged mammal with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            animal: Animal::new(name),
            legs: 4,
        }
    }
}

impl Dog {
    /// A good dog with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            mammal: Mammal::new(name),
            good: true,
        }
    }

    /// Name, read through the parent chain.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.mammal.animal.name
    }
}

impl Cat {
    /// An indoor cat with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            mammal: Mammal::new(name),
            indoor: true,
        }
    }
}

/// A bus whose dead-letter and failure sinks both record into the returned
/// [`RecordingSink`].
#[must_use]
pub fn test_bus() -> (Bus, RecordingSink) {
    let sink = RecordingSink::new();
    let bus = Bus::new(sink.clone(), sink.clone());
    (bus, sink)
}
