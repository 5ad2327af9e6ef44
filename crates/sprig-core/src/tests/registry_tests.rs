use super::*;
use crate::{create_element, Child, Config};

fn blank(_props: &Props) -> VNode {
    create_element("div", Config::new(), std::iter::empty::<Child>())
}

const ITEM: FunctionComponent = FunctionComponent::new("Item", blank);

#[test]
fn keyed_identity_is_name_and_key() {
    let mut registry = Registry::new();
    let instance = registry.create_instance(ITEM, Props::default(), Some(&Key::from("a")), 0);
    assert_eq!(instance.identity().as_str(), "Item:a");
    assert!(registry
        .find(&ITEM, &Key::from("a"))
        .is_some_and(|found| Rc::ptr_eq(&found, &instance)));
}

#[test]
fn unkeyed_identities_follow_creation_order() {
    let mut registry = Registry::new();
    let first = registry.create_instance(ITEM, Props::default(), None, 0);
    let second = registry.create_instance(ITEM, Props::default(), None, 0);
    assert_eq!(first.identity().as_str(), "Item#1");
    assert_eq!(second.identity().as_str(), "Item#2");
    assert_eq!(registry.len(), 2);
}

#[test]
fn update_instance_merges_in_place() {
    let mut registry = Registry::new();
    let instance = registry.create_instance(ITEM, Props::default(), Some(&Key::from(7)), 1);
    let props = create_element("x", Config::new().attr("label", "new"), std::iter::empty::<Child>())
        .props()
        .clone();
    assert!(registry.update_instance(
        instance.identity(),
        InstanceUpdate::default().props(props).container(9)
    ));
    assert_eq!(instance.container(), 9);
    assert_eq!(instance.with_props(|props| props.get_str("label").map(str::to_owned)), Some("new".to_string()));

    let unknown = IdentityKey::keyed(&ITEM, &Key::from(8));
    assert!(!registry.update_instance(&unknown, InstanceUpdate::default().container(3)));
}

#[test]
fn removal_marks_immediately_and_releases_later() {
    let mut registry = Registry::new();
    let instance = registry.create_instance(ITEM, Props::default(), Some(&Key::from("a")), 0);
    let identity = instance.identity().clone();

    let removed = registry.remove_instance(&identity).expect("first removal");
    assert!(removed.is_removed());
    assert!(registry.remove_instance(&identity).is_none());
    assert!(registry.contains(&identity));

    assert!(registry.release(&instance));
    assert!(!registry.contains(&identity));
}

#[test]
fn release_leaves_a_newer_instance_under_the_same_key() {
    let mut registry = Registry::new();
    let old = registry.create_instance(ITEM, Props::default(), Some(&Key::from("a")), 0);
    registry.remove_instance(old.identity());
    let new = registry.create_instance(ITEM, Props::default(), Some(&Key::from("a")), 0);

    assert!(!registry.release(&old));
    let current = registry.get_instance(new.identity()).expect("newer instance");
    assert!(Rc::ptr_eq(&current, &new));
    assert!(!current.is_removed());
}

#[test]
fn displaced_instance_is_held_until_released() {
    let mut registry = Registry::new();
    let (first, displaced) = registry.insert_instance(ITEM, Props::default(), Some(&Key::from("a")), 0);
    assert!(displaced.is_none());
    let weak = Rc::downgrade(&first);
    drop(first);

    let (second, displaced) = registry.insert_instance(ITEM, Props::default(), Some(&Key::from("a")), 1);
    let displaced = displaced.expect("first instance was still mounted");
    drop(displaced);
    assert!(weak.upgrade().is_some(), "the registry keeps the displaced instance");
    assert_eq!(registry.len(), 1);

    let held = weak.upgrade().expect("held");
    assert!(!registry.release(&held), "its key belongs to the newer instance");
    drop(held);
    assert!(weak.upgrade().is_none());
    assert!(registry.contains(second.identity()));
}
