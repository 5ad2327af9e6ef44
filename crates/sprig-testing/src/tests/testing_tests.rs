use super::*;
use crate::assertions::{assert_no_mutations, assert_text};
use sprig_core::{create_element, use_state, Child, Config, FunctionComponent, Props};
use std::cell::Cell;
use std::rc::Rc;

fn echo(_props: &Props) -> VNode {
    let (value, set_value) = use_state(String::new);
    create_element(
        "label",
        Config::new(),
        [
            Child::from(create_element(
                "input",
                Config::new()
                    .set("value", value.clone())
                    .on("input", move |event| {
                        set_value.set(event.value().unwrap_or_default().to_string());
                    }),
                std::iter::empty::<Child>(),
            )),
            Child::from(create_element("output", Config::new(), [value])),
        ],
    )
}

const ECHO: FunctionComponent = FunctionComponent::new("Echo", echo);

#[test]
fn test_root_reports_content_and_renders() {
    run_test_root(|root| {
        assert!(!root.has_content());
        assert_eq!(root.text(), "");

        let renders = Rc::new(Cell::new(0));
        root.set_content({
            let renders = Rc::clone(&renders);
            move || {
                renders.set(renders.get() + 1);
                create_element("h1", Config::new(), [format!("render {}", renders.get())])
            }
        })
        .expect("install content");

        assert!(root.has_content());
        assert_text(root, "render 1");

        root.rerender().expect("rerender");
        assert_eq!(renders.get(), 2);
        assert_text(root, "render 2");
        assert_eq!(root.find_by_tag("h1").len(), 1);
    });
}

#[test]
fn input_events_carry_their_value() {
    let mut root = TestRoot::new();
    root.set_content(|| create_element(ECHO, Config::new(), std::iter::empty::<Child>()))
        .expect("install content");
    let input = root.expect_tag("input");

    let rerenders = root.input(input, "hello").expect("input");
    assert_eq!(rerenders, 1);
    assert_text(&root, "hello");
    assert_eq!(
        root.document().property(input, "value").and_then(|value| value.as_str()),
        Some("hello")
    );
    assert_eq!(root.find_by_text("hello"), vec![root.expect_tag("output")]);
}

#[test]
fn pump_until_idle_on_an_idle_root_does_nothing() {
    let mut root = TestRoot::new();
    root.set_content(|| create_element("p", Config::new(), ["still"]))
        .expect("install content");
    root.take_mutations();
    assert_eq!(root.pump_until_idle().expect("pump"), 0);
    assert_eq!(root.flush_requests(), 0);
    root.rerender().expect("rerender");
    assert_no_mutations(&mut root, "unchanged content");
}

#[test]
fn unmount_empties_the_container() {
    let mut root = TestRoot::new();
    root.set_content(|| create_element("p", Config::new(), ["bye"]))
        .expect("install content");
    assert!(root.unmount().expect("unmount"));
    assert!(!root.unmount().expect("second unmount"));
    assert_text(&root, "");
    assert!(root.has_content());
}

#[test]
#[should_panic(expected = "no <table> under the test root")]
fn expect_tag_names_the_missing_tag() {
    let mut root = TestRoot::new();
    root.set_content(|| create_element("p", Config::new(), ["x"]))
        .expect("install content");
    root.expect_tag("table");
}
