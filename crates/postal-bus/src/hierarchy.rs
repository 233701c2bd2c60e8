//! Runtime type tags and the message type hierarchy.
//!
//! Rust has no class inheritance, so a hierarchy is declared by composition:
//! a subtype embeds its parent and hands out a reference to it through
//! [`MessageType::parent`]. Top-level types name [`dyn Message`](Message) as
//! their parent, which makes `dyn Message` the universal root every message
//! descends from.
//!
//! ```rust
//! use postal_bus::{Message, TypeTag, message_type};
//!
//! #[derive(Debug)]
//! struct Animal {
//!     name: String,
//! }
//!
//! #[derive(Debug)]
//! struct Dog {
//!     animal: Animal,
//!     good: bool,
//! }
//!
//! message_type!(Animal);
//! message_type!(Dog: Animal => animal);
//!
//! let dog = Dog {
//!     animal: Animal { name: "rex".into() },
//!     good: true,
//! };
//! let erased: &dyn Message = &dog;
//!
//! assert_eq!(
//!     erased.ancestry(),
//!     vec![TypeTag::root(), TypeTag::of::<Animal>(), TypeTag::of::<Dog>()]
//! );
//! assert_eq!(erased.downcast_ref::<Animal>().map(|a| a.name.as_str()), Some("rex"));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

/// Runtime tag identifying one message type.
///
/// Equality and hashing use the [`TypeId`] only; the name is carried for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag of `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Tag of the universal root type, `dyn Message`.
    #[must_use]
    pub fn root() -> Self {
        Self::of::<dyn Message>()
    }

    /// Whether this is the root tag.
    #[must_use]
    pub fn is_root(&self) -> bool {
        *self == Self::root()
    }

    /// Fully qualified type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeTag").field(&self.name).finish()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declares where a concrete message type sits in the hierarchy.
///
/// Implement this (or use [`message_type!`](crate::message_type)) for every
/// type published on a bus. [`Message`] and [`Lineage`] are derived from it.
pub trait MessageType: fmt::Debug + Send + Sync + 'static {
    /// The direct supertype: another message type, or `dyn Message` for a
    /// top-level type.
    type Parent: Lineage + ?Sized;

    /// View of `self` as its direct supertype.
    fn parent(&self) -> &Self::Parent;
}

/// A value that can be published on a bus.
///
/// Blanket-implemented for every [`MessageType`]; the bus only ever handles
/// messages as `dyn Message`.
pub trait Message: Any + fmt::Debug + Send + Sync + 'static {
    /// Tag of the concrete runtime type.
    fn type_tag(&self) -> TypeTag;

    /// Full ancestor chain, root first, ending with [`Message::type_tag`].
    fn ancestry(&self) -> Vec<TypeTag>;

    /// View of `self` as the ancestor identified by `tag`, if it is one.
    fn project_to(&self, tag: TypeTag) -> Option<&dyn Any>;
}

impl<T: MessageType> Message for T {
    fn type_tag(&self) -> TypeTag {
        <T as Lineage>::tag()
    }

    fn ancestry(&self) -> Vec<TypeTag> {
        let mut chain = Vec::new();
        <T as Lineage>::collect_ancestry(&mut chain);
        chain
    }

    fn project_to(&self, tag: TypeTag) -> Option<&dyn Any> {
        Lineage::project(self, tag)
    }
}

impl dyn Message {
    /// Whether this message is a `T`, directly or through a subtype.
    #[must_use]
    pub fn is<T: MessageType>(&self) -> bool {
        self.project_to(TypeTag::of::<T>()).is_some()
    }

    /// View this message as `T`, walking up the hierarchy when the runtime
    /// type is a subtype of `T`.
    #[must_use]
    pub fn downcast_ref<T: MessageType>(&self) -> Option<&T> {
        self.project_to(TypeTag::of::<T>())
            .and_then(|any| any.downcast_ref::<T>())
    }
}

/// Static position of a type in the hierarchy.
///
/// Implemented for every [`MessageType`] and for `dyn Message`, the root.
/// This is the bound mailboxes are generic over, so a mailbox can target any
/// level of the hierarchy including the root.
pub trait Lineage: fmt::Debug + 'static {
    /// Tag of this type.
    fn tag() -> TypeTag;

    /// Push this type's ancestor chain, root first, ending with itself.
    fn collect_ancestry(out: &mut Vec<TypeTag>);

    /// View a published message as this type.
    fn narrow(message: &dyn Message) -> Option<&Self>;

    /// Walk from `self` towards the root looking for `tag`.
    fn project(&self, tag: TypeTag) -> Option<&dyn Any>;
}

impl<T: MessageType> Lineage for T {
    fn tag() -> TypeTag {
        TypeTag::of::<T>()
    }

    fn collect_ancestry(out: &mut Vec<TypeTag>) {
        <T::Parent as Lineage>::collect_ancestry(out);
        out.push(Self::tag());
    }

    fn narrow(message: &dyn Message) -> Option<&Self> {
        message.downcast_ref::<T>()
    }

    fn project(&self, tag: TypeTag) -> Option<&dyn Any> {
        if tag == Self::tag() {
            return Some(self as &dyn Any);
        }
        self.parent().project(tag)
    }
}

impl Lineage for dyn Message {
    fn tag() -> TypeTag {
        TypeTag::root()
    }

    fn collect_ancestry(out: &mut Vec<TypeTag>) {
        out.push(Self::tag());
    }

    fn narrow(message: &dyn Message) -> Option<&Self> {
        Some(message)
    }

    // The root carries no data of its own.
    fn project(&self, _tag: TypeTag) -> Option<&dyn Any> {
        None
    }
}

/// Implement [`MessageType`] for a top-level type or for a subtype that
/// embeds its parent in a field.
///
/// ```rust
/// use postal_bus::message_type;
///
/// #[derive(Debug)]
/// struct Shape;
/// #[derive(Debug)]
/// struct Circle {
///     shape: Shape,
///     radius: f64,
/// }
///
/// message_type!(Shape);
/// message_type!(Circle: Shape => shape);
/// ```
#[macro_export]
macro_rules! message_type {
    ($ty:ty : $parent:ty => $field:ident) => {
        impl $crate::MessageType for $ty {
            type Parent = $parent;

            fn parent(&self) -> &Self::Parent {
                &self.$field
            }
        }
    };
    ($ty:ty) => {
        impl $crate::MessageType for $ty {
            type Parent = dyn $crate::Message;

            fn parent(&self) -> &Self::Parent {
                self
            }
        }
    };
}

/// Resolves and caches ancestor chains per concrete message type.
///
/// A chain is computed the first time a type is published and reused for
/// every later publish of the same type.
#[derive(Default)]
pub struct TypeHierarchy {
    chains: DashMap<TypeTag, Arc<[TypeTag]>>,
}

impl fmt::Debug for TypeHierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHierarchy")
            .field("cached_types", &self.chains.len())
            .finish()
    }
}

impl TypeHierarchy {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ancestor chain of the message's runtime type, root first.
    pub fn resolve(&self, message: &dyn Message) -> Arc<[TypeTag]> {
        let tag = message.type_tag();
        if let Some(chain) = self.chains.get(&tag) {
            return Arc::clone(chain.value());
        }

        let chain: Arc<[TypeTag]> = message.ancestry().into();
        trace!(message_type = %tag, depth = chain.len(), "Resolved ancestor chain");
        Arc::clone(self.chains.entry(tag).or_insert(chain).value())
    }

    /// Number of concrete types with a cached chain.
    #[must_use]
    pub fn cached_types(&self) -> usize {
        self.chains.len()
    }
}
