//! Subscription registry: type tag to ordered mailbox list.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::debug;

use crate::error::{BusError, BusResult};
use crate::hierarchy::TypeTag;
use crate::mailbox::MailboxRef;

/// One `(type, mailbox)` registration.
#[derive(Debug, Clone)]
pub struct Subscription {
    seq: u64,
    mailbox: MailboxRef,
}

impl Subscription {
    /// Registration sequence number, increasing across the registry.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The subscribed mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &MailboxRef {
        &self.mailbox
    }
}

/// Snapshot of the subscriptions registered against one type.
///
/// The list is shared copy-on-write with the registry: later subscribes and
/// unsubscribes never change a snapshot already taken.
#[derive(Debug, Clone)]
pub struct Route {
    tag: TypeTag,
    subscriptions: Arc<Vec<Subscription>>,
}

impl Route {
    /// Type these subscriptions were registered against.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Subscriptions in registration order.
    #[must_use]
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }
}

/// Concurrent registry of subscriptions, keyed by the type each mailbox
/// listens for.
///
/// Each type owns an ordered list held behind an `Arc`. Mutations edit the
/// list copy-on-write under the map's shard lock; lookups clone the `Arc`s
/// and release every lock before returning.
#[derive(Default)]
pub struct SubscriptionRegistry {
    routes: DashMap<TypeTag, Arc<Vec<Subscription>>>,
    next_seq: AtomicU64,
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("types", &self.routes.len())
            .field("subscription_count", &self.len())
            .finish()
    }
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `mailbox` to the list for its target type.
    ///
    /// Returns the registration sequence number.
    pub fn subscribe(&self, mailbox: MailboxRef) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let tag = mailbox.target();
        let name = mailbox.name().to_owned();

        {
            let mut list = self.routes.entry(tag).or_default();
            Arc::make_mut(list.value_mut()).push(Subscription { seq, mailbox });
        }

        debug!(mailbox = %name, target = %tag, seq, "Mailbox subscribed");
        seq
    }

    /// Remove the first subscription of `mailbox` from its target type.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotSubscribed`] if the mailbox is not currently
    /// registered for its target type.
    pub fn unsubscribe(&self, mailbox: &MailboxRef) -> BusResult<()> {
        let tag = mailbox.target();
        let not_subscribed = || BusError::NotSubscribed {
            mailbox: mailbox.name().to_owned(),
            message_type: tag.name(),
        };

        // The removed entry is dropped only after the shard lock is released,
        // so a handler whose drop touches the bus cannot deadlock.
        let removed = {
            let mut list = self.routes.get_mut(&tag).ok_or_else(not_subscribed)?;
            let position = list
                .iter()
                .position(|s| s.mailbox.ptr_eq(mailbox))
                .ok_or_else(not_subscribed)?;
            Arc::make_mut(list.value_mut()).remove(position)
        };
        self.routes.remove_if(&tag, |_, list| list.is_empty());

        debug!(
            mailbox = %removed.mailbox.name(),
            target = %tag,
            seq = removed.seq,
            "Mailbox unsubscribed"
        );
        Ok(())
    }

    /// Subscriptions for every type in `ancestry` that has any, in the order
    /// of `ancestry` (root first).
    #[must_use]
    pub fn entries_for(&self, ancestry: &[TypeTag]) -> Vec<Route> {
        ancestry
            .iter()
            .filter_map(|tag| {
                let list = self.routes.get(tag)?;
                if list.is_empty() {
                    return None;
                }
                Some(Route {
                    tag: *tag,
                    subscriptions: Arc::clone(list.value()),
                })
            })
            .collect()
    }

    /// Number of subscriptions registered against exactly `tag`.
    #[must_use]
    pub fn count_for(&self, tag: TypeTag) -> usize {
        self.routes.get(&tag).map_or(0, |list| list.len())
    }

    /// Total number of subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.iter().map(|entry| entry.value().len()).sum()
    }

    /// Whether nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.iter().all(|entry| entry.value().is_empty())
    }

    /// Remove every subscription registered when the call starts.
    ///
    /// The removed lists are dropped once no shard lock is held, so a
    /// handler whose drop subscribes again lands in the emptied registry.
    pub fn clear(&self) {
        let tags: Vec<TypeTag> = self.routes.iter().map(|entry| *entry.key()).collect();
        let removed: Vec<Arc<Vec<Subscription>>> = tags
            .iter()
            .filter_map(|tag| self.routes.remove(tag).map(|(_, list)| list))
            .collect();

        debug!(types = removed.len(), "All subscriptions cleared");
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Message;
    use crate::mailbox::Mailbox;
    use crate::message_type;

    #[derive(Debug)]
    struct Base;

    #[derive(Debug)]
    struct Derived {
        base: Base,
    }

    message_type!(Base);
    message_type!(Derived: Base => base);

    fn names(route: &Route) -> Vec<&str> {
        route
            .subscriptions()
            .iter()
            .map(|s| s.mailbox().name())
            .collect()
    }

    #[test]
    fn test_subscribe_preserves_registration_order() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(Mailbox::<Base>::from_fn("first", |_| {}).erase());
        registry.subscribe(Mailbox::<Base>::from_fn("second", |_| {}).erase());

        let routes = registry.entries_for(&[TypeTag::of::<Base>()]);
        assert_eq!(routes.len(), 1);
        assert_eq!(names(&routes[0]), vec!["first", "second"]);
        assert!(routes[0].subscriptions()[0].seq() < routes[0].subscriptions()[1].seq());
    }

    #[test]
    fn test_entries_follow_ancestry_order() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(Mailbox::<Derived>::from_fn("derived", |_| {}).erase());
        registry.subscribe(Mailbox::<dyn Message>::from_fn("root", |_| {}).erase());
        registry.subscribe(Mailbox::<Base>::from_fn("base", |_| {}).erase());

        let ancestry = Derived { base: Base }.ancestry();
        let routes = registry.entries_for(&ancestry);
        let tags: Vec<TypeTag> = routes.iter().map(Route::tag).collect();
        assert_eq!(tags, ancestry);
    }

    #[test]
    fn test_entries_skip_types_without_subscriptions() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(Mailbox::<Derived>::from_fn("derived", |_| {}).erase());

        let routes = registry.entries_for(&Derived { base: Base }.ancestry());
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].tag(), TypeTag::of::<Derived>());
        assert!(registry.entries_for(&Base.ancestry()).is_empty());
    }

    #[test]
    fn test_unsubscribe_removes_by_identity() {
        let registry = SubscriptionRegistry::new();
        let keep = Mailbox::<Base>::from_fn("same-name", |_| {});
        let drop_me = Mailbox::<Base>::from_fn("same-name", |_| {});
        registry.subscribe(keep.erase());
        registry.subscribe(drop_me.erase());

        registry.unsubscribe(&drop_me.erase()).unwrap();

        let routes = registry.entries_for(&[TypeTag::of::<Base>()]);
        assert_eq!(routes[0].subscriptions().len(), 1);
        assert!(routes[0].subscriptions()[0].mailbox().is(&keep));
    }

    #[test]
    fn test_unsubscribe_unknown_mailbox_is_not_found() {
        let registry = SubscriptionRegistry::new();
        let never = Mailbox::<Base>::from_fn("never", |_| {});
        assert!(matches!(
            registry.unsubscribe(&never.erase()),
            Err(BusError::NotSubscribed { .. })
        ));

        // Same type registered, different identity.
        registry.subscribe(Mailbox::<Base>::from_fn("other", |_| {}).erase());
        assert!(matches!(
            registry.unsubscribe(&never.erase()),
            Err(BusError::NotSubscribed { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unsubscribe_removes_only_first_duplicate() {
        let registry = SubscriptionRegistry::new();
        let twice = Mailbox::<Base>::from_fn("twice", |_| {});
        registry.subscribe(twice.erase());
        registry.subscribe(twice.erase());

        registry.unsubscribe(&twice.erase()).unwrap();
        assert_eq!(registry.count_for(TypeTag::of::<Base>()), 1);

        registry.unsubscribe(&twice.erase()).unwrap();
        assert_eq!(registry.count_for(TypeTag::of::<Base>()), 0);
        assert!(registry.unsubscribe(&twice.erase()).is_err());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutation() {
        let registry = SubscriptionRegistry::new();
        let a = Mailbox::<Base>::from_fn("a", |_| {});
        registry.subscribe(a.erase());

        let snapshot = registry.entries_for(&[TypeTag::of::<Base>()]);
        registry.unsubscribe(&a.erase()).unwrap();
        registry.subscribe(Mailbox::<Base>::from_fn("b", |_| {}).erase());

        assert_eq!(names(&snapshot[0]), vec!["a"]);
        let fresh = registry.entries_for(&[TypeTag::of::<Base>()]);
        assert_eq!(names(&fresh[0]), vec!["b"]);
    }

    #[test]
    fn test_len_and_clear() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.is_empty());

        registry.subscribe(Mailbox::<Base>::from_fn("a", |_| {}).erase());
        registry.subscribe(Mailbox::<Derived>::from_fn("b", |_| {}).erase());
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    /// Subscribes a replacement mailbox when dropped.
    struct Resubscribe(Arc<SubscriptionRegistry>);

    impl Drop for Resubscribe {
        fn drop(&mut self) {
            self.0
                .subscribe(Mailbox::<Base>::from_fn("replacement", |_| {}).erase());
        }
    }

    #[test]
    fn test_clear_drops_subscriptions_outside_the_lock() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let guard = Resubscribe(Arc::clone(&registry));
        registry.subscribe(
            Mailbox::<Base>::from_fn("holder", move |_| {
                let _held = &guard;
            })
            .erase(),
        );

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        let worker = Arc::clone(&registry);
        std::thread::spawn(move || {
            worker.clear();
            let _ = done_tx.send(());
        });

        assert!(
            done_rx
                .recv_timeout(std::time::Duration::from_secs(5))
                .is_ok(),
            "clear did not return"
        );
        let routes = registry.entries_for(&[TypeTag::of::<Base>()]);
        assert_eq!(names(&routes[0]), vec!["replacement"]);
    }
}
