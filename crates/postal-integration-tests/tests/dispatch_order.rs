//! Integration tests for delivery order across the type hierarchy.

use postal_bus::{Mailbox, Message, TypeTag};
use postal_test::{Animal, Cat, DeliveryLog, Dog, Left, Mammal, Right, test_bus};

#[test]
fn test_leaf_delivery_runs_root_to_leaf_regardless_of_subscription_order() {
    let (bus, sink) = test_bus();
    let log = DeliveryLog::new();

    bus.subscribe(&log.mailbox::<Dog>("dog"));
    bus.subscribe(&log.mailbox::<Mammal>("mammal"));
    bus.subscribe(&log.mailbox::<dyn Message>("root"));
    bus.subscribe(&log.mailbox::<Animal>("animal"));

    bus.publish(Dog::new("rex")).unwrap();

    assert_eq!(log.mailboxes(), vec!["root", "animal", "mammal", "dog"]);
    assert_eq!(sink.returned_count(), 0);
    assert_eq!(sink.failed_count(), 0);
}

#[test]
fn test_each_mailbox_sees_its_own_view() {
    let (bus, _sink) = test_bus();
    let log = DeliveryLog::new();

    bus.subscribe(&log.mailbox::<Animal>("animal"));
    bus.subscribe(&log.mailbox::<Dog>("dog"));
    bus.publish(Dog::new("rex")).unwrap();

    let entries = log.entries();
    assert_eq!(entries[0].target, TypeTag::of::<Animal>());
    assert!(entries[0].rendered.starts_with("Animal"));
    assert_eq!(entries[1].target, TypeTag::of::<Dog>());
    assert!(entries[1].rendered.starts_with("Dog"));
    assert!(entries.iter().all(|e| e.rendered.contains("rex")));
}

#[test]
fn test_same_type_mailboxes_run_in_subscription_order() {
    let (bus, _sink) = test_bus();
    let log = DeliveryLog::new();

    for name in ["first", "second", "third"] {
        bus.subscribe(&log.mailbox::<Cat>(name));
    }
    bus.publish(Cat::new("tom")).unwrap();

    assert_eq!(log.mailboxes(), vec!["first", "second", "third"]);
}

#[test]
fn test_each_subscription_is_delivered_once_per_publish() {
    let (bus, _sink) = test_bus();
    let log = DeliveryLog::new();
    let twice = log.mailbox::<Animal>("twice");

    bus.subscribe(&twice);
    bus.subscribe(&twice);
    bus.publish(Animal::new("generic")).unwrap();
    assert_eq!(log.count_for("twice"), 2);

    bus.unsubscribe(&twice).unwrap();
    bus.publish(Animal::new("generic")).unwrap();
    assert_eq!(log.count_for("twice"), 3);
}

#[test]
fn test_sibling_subtypes_do_not_receive_each_other() {
    let (bus, sink) = test_bus();
    let log = DeliveryLog::new();

    bus.subscribe(&log.mailbox::<Cat>("cats"));
    bus.publish(Dog::new("rex")).unwrap();

    assert!(log.is_empty());
    assert_eq!(sink.returned_count(), 1);
}

#[test]
fn test_unrelated_types_do_not_leak() {
    let (bus, sink) = test_bus();
    let log = DeliveryLog::new();

    bus.subscribe(&log.mailbox::<Left>("left"));
    bus.publish(Right(1)).unwrap();

    assert!(log.is_empty());
    let returned = sink.returned_messages();
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].message().downcast_ref::<Right>(), Some(&Right(1)));

    bus.publish(Left(2)).unwrap();
    assert_eq!(log.mailboxes(), vec!["left"]);
}

#[test]
fn test_root_mailbox_receives_everything() {
    let (bus, sink) = test_bus();
    let log = DeliveryLog::new();

    bus.subscribe(&log.mailbox::<dyn Message>("all"));
    bus.publish(Left(1)).unwrap();
    bus.publish(Cat::new("tom")).unwrap();
    bus.publish(Animal::new("x")).unwrap();

    assert_eq!(log.count_for("all"), 3);
    assert_eq!(sink.returned_count(), 0);
}

#[test]
fn test_publish_shared_delivers_same_allocation() {
    let (bus, _sink) = test_bus();
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_clone = std::sync::Arc::clone(&seen);

    bus.subscribe(&Mailbox::<Dog>::from_fn("dogs", move |dog| {
        seen_clone.lock().unwrap().push(dog.name().to_owned());
    }));

    let message: std::sync::Arc<dyn Message> = std::sync::Arc::new(Dog::new("fido"));
    bus.publish_shared(std::sync::Arc::clone(&message)).unwrap();
    bus.publish_shared(message).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["fido", "fido"]);
}
