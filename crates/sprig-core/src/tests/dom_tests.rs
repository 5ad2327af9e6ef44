use super::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn insert_before_moves_attached_nodes() {
    let mut doc = MemoryDocument::new();
    let list = doc.create_container("ul");
    let a = doc.create_text("a");
    let b = doc.create_text("b");
    let c = doc.create_text("c");
    for node in [a, b, c] {
        doc.insert_before(list, node, None).expect("append");
    }
    doc.insert_before(list, c, Some(a)).expect("move");
    assert_eq!(doc.children(list).expect("children"), &[c, a, b]);
    assert_eq!(doc.text_content(list), "cab");
    assert_eq!(doc.next_sibling(a), Some(b));
    assert_eq!(doc.next_sibling(b), None);
}

#[test]
fn mutations_are_recorded_only_for_connected_nodes() {
    let mut doc = MemoryDocument::new();
    let container = doc.create_container("div");
    doc.clear_mutations();

    let detached = doc.create_element("p");
    doc.set_attribute(detached, "id", "x").expect("attr");
    let text = doc.create_text("hi");
    doc.insert_before(detached, text, None).expect("append");
    assert!(doc.mutations().is_empty());

    doc.insert_before(container, detached, None).expect("attach");
    doc.set_text(text, "ho").expect("text");
    doc.set_attribute(detached, "id", "y").expect("attr");
    let records = doc.take_mutations();
    assert_eq!(records.len(), 3);
    assert!(matches!(records[0], MutationRecord::ChildList { target, .. } if target == container));
    assert_eq!(records[1], MutationRecord::CharacterData { target: text });
    assert_eq!(
        records[2],
        MutationRecord::Attribute {
            target: detached,
            name: "id".to_string()
        }
    );
}

#[test]
fn style_writes_surface_as_style_attribute() {
    let mut doc = MemoryDocument::new();
    let node = doc.create_container("div");
    doc.set_style(node, "color", "red").expect("style");
    doc.set_style(node, "width", "10px").expect("style");
    assert_eq!(doc.attribute(node, "style"), Some("color: red; width: 10px;"));
    doc.remove_style(node, "color").expect("style");
    doc.remove_style(node, "width").expect("style");
    assert_eq!(doc.attribute(node, "style"), None);
    assert_eq!(doc.style(node, "color"), None);
}

#[test]
fn dispatch_bubbles_to_ancestors() {
    let mut doc = MemoryDocument::new();
    let outer = doc.create_container("div");
    let inner = doc.create_element("button");
    doc.insert_before(outer, inner, None).expect("append");
    let log = Rc::new(RefCell::new(Vec::new()));
    for (node, name) in [(inner, "inner"), (outer, "outer")] {
        let log = Rc::clone(&log);
        doc.add_listener(
            node,
            "click",
            EventHandler::new(move |event| log.borrow_mut().push((name, event.target()))),
        )
        .expect("listener");
    }
    let ran = doc.dispatch_event(inner, Event::new("click"));
    assert_eq!(ran, 2);
    assert_eq!(
        *log.borrow(),
        vec![("inner", Some(inner)), ("outer", Some(inner))]
    );
    assert_eq!(doc.dispatch_event(inner, Event::new("input")), 0);
}

#[test]
fn disposed_ids_are_never_reused() {
    let mut doc = MemoryDocument::new();
    let container = doc.create_container("div");
    let child = doc.create_element("span");
    doc.insert_before(container, child, None).expect("append");
    doc.remove_child(container, child).expect("remove");
    doc.dispose(child);
    assert!(!doc.contains(child));
    let next = doc.create_element("span");
    assert_ne!(next, child);
    assert_eq!(
        doc.set_attribute(child, "id", "x"),
        Err(NodeError::Missing { id: child })
    );
}

#[test]
fn remove_child_rejects_foreign_nodes() {
    let mut doc = MemoryDocument::new();
    let a = doc.create_container("div");
    let b = doc.create_container("div");
    let child = doc.create_text("x");
    doc.insert_before(a, child, None).expect("append");
    assert_eq!(
        doc.remove_child(b, child),
        Err(NodeError::NotAChild { parent: b, child })
    );
}
