use super::*;
use crate::assertions::{assert_no_mutations, assert_text, child_list_count};
use sprig_core::{
    class, create_element, use_effect, use_effect_with, use_shared_state, use_state, Child,
    ClassContext, Component, Config, EffectCleanup, FunctionComponent, Props,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

thread_local! {
    static RENDERS: Cell<usize> = const { Cell::new(0) };
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn log(entry: impl Into<String>) {
    LOG.with(|log| log.borrow_mut().push(entry.into()));
}

fn take_log() -> Vec<String> {
    LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

fn reset() {
    RENDERS.with(|count| count.set(0));
    take_log();
}

fn renders() -> usize {
    RENDERS.with(Cell::get)
}

fn component(component: FunctionComponent) -> VNode {
    component_with(component, Config::new())
}

fn component_with(component: FunctionComponent, config: Config) -> VNode {
    create_element(component, config, std::iter::empty::<Child>())
}

fn counter(_props: &Props) -> VNode {
    RENDERS.with(|count| count.set(count.get() + 1));
    let (count, set_count) = use_state(|| 0_i32);
    create_element(
        "div",
        Config::new(),
        [
            create_element("span", Config::new().class_name("value"), [count]),
            create_element(
                "button",
                Config::new().on("click", move |_| set_count.update(|count| count + 1)),
                ["+"],
            ),
        ],
    )
}

const COUNTER: FunctionComponent = FunctionComponent::new("Counter", counter);

#[test]
fn counter_reaches_two_after_two_clicks() {
    reset();
    let mut root = TestRoot::new();
    root.set_content(|| component(COUNTER)).expect("install content");
    let button = root.expect_tag("button");
    let span = root.expect_tag("span");

    assert_eq!(root.click(button).expect("first click"), 1);
    assert_eq!(root.click(button).expect("second click"), 1);

    assert_eq!(root.document().text_content(span), "2");
    assert_eq!(renders() - 1, 2, "exactly two re-renders");
    assert_eq!(root.stats().rerenders, 2);
    assert_eq!(root.expect_tag("button"), button);
}

fn label(_props: &Props) -> VNode {
    let (text, set_text) = use_state(|| "old".to_string());
    create_element(
        "p",
        Config::new().on("click", move |_| set_text.set("new".to_string())),
        [text],
    )
}

const LABEL: FunctionComponent = FunctionComponent::new("Label", label);

#[test]
fn old_text_becomes_new_in_the_same_element() {
    let mut root = TestRoot::new();
    root.set_content(|| component(LABEL)).expect("install content");
    let paragraph = root.expect_tag("p");
    assert_text(&root, "old");
    root.take_mutations();

    root.click(paragraph).expect("click");
    assert_text(&root, "new");
    assert_eq!(root.expect_tag("p"), paragraph);
    let records = root.take_mutations();
    assert_eq!(records.len(), 1, "only the text changed: {records:?}");
    assert_eq!(child_list_count(&records), 0);
}

#[test]
fn unchanged_rerender_writes_nothing() {
    let mut root = TestRoot::new();
    root.set_content(|| {
        create_element(
            "main",
            Config::new().class_name("app").style("margin", "0"),
            [component(COUNTER), component(LABEL)],
        )
    })
    .expect("install content");
    root.take_mutations();

    root.rerender().expect("rerender");
    root.pump_until_idle().expect("pump");
    assert_no_mutations(&mut root, "identical tree");
}

fn toggler(_props: &Props) -> VNode {
    RENDERS.with(|count| count.set(count.get() + 1));
    let (mode, set_mode) = use_state(|| "a".to_string());
    create_element(
        "button",
        Config::new().on("click", move |_| {
            set_mode.set("b".to_string());
            set_mode.set("a".to_string());
        }),
        [mode],
    )
}

const TOGGLER: FunctionComponent = FunctionComponent::new("Toggler", toggler);

#[test]
fn a_to_b_to_a_performs_no_rerender() {
    reset();
    let mut root = TestRoot::new();
    root.set_content(|| component(TOGGLER)).expect("install content");
    root.take_mutations();

    let rerenders = root.click(root.expect_tag("button")).expect("click");
    assert_eq!(rerenders, 0);
    assert_eq!(renders(), 1);
    assert!(root.take_mutations().is_empty());
}

fn shared_a(_props: &Props) -> VNode {
    let (count, _) = use_shared_state("clicks", || 0_i32);
    log(format!("A {count}"));
    create_element("i", Config::new(), [count])
}

fn shared_b(_props: &Props) -> VNode {
    let (count, set_count) = use_shared_state("clicks", || 0_i32);
    log(format!("B {count}"));
    create_element(
        "button",
        Config::new().on("click", move |_| {
            set_count.update(|count| count + 1);
            set_count.update(|count| count + 1);
        }),
        [count],
    )
}

const SHARED_A: FunctionComponent = FunctionComponent::new("CounterA", shared_a);
const SHARED_B: FunctionComponent = FunctionComponent::new("CounterB", shared_b);

#[test]
fn batched_updates_rerender_each_observer_once() {
    reset();
    let mut root = TestRoot::new();
    root.set_content(|| {
        create_element("div", Config::new(), [component(SHARED_A), component(SHARED_B)])
    })
    .expect("install content");
    assert_eq!(take_log(), vec!["A 0", "B 0"]);

    let rerenders = root.click(root.expect_tag("button")).expect("click");
    assert_eq!(rerenders, 2);
    assert_eq!(take_log(), vec!["A 2", "B 2"]);
    assert_text(&root, "22");
}

fn watcher(props: &Props) -> VNode {
    let step = props.get_int("step").unwrap_or(0);
    use_effect_with(step, move || {
        log(format!("effect {step}"));
        EffectCleanup::new(move || log(format!("cleanup {step}")))
    });
    create_element("em", Config::new(), [step])
}

const WATCHER: FunctionComponent = FunctionComponent::new("Watcher", watcher);

#[test]
fn effects_rerun_only_for_changed_deps_with_cleanup_first() {
    reset();
    let step = Rc::new(Cell::new(1_i64));
    let mut root = TestRoot::new();
    root.set_content({
        let step = Rc::clone(&step);
        move || component_with(WATCHER, Config::new().set("step", step.get()))
    })
    .expect("install content");
    assert!(take_log().is_empty(), "effects wait for the flush");
    root.pump_until_idle().expect("pump");
    assert_eq!(take_log(), vec!["effect 1"]);

    root.rerender().expect("same deps");
    root.pump_until_idle().expect("pump");
    assert!(take_log().is_empty());

    step.set(2);
    root.rerender().expect("new deps");
    root.pump_until_idle().expect("pump");
    assert_eq!(take_log(), vec!["cleanup 1", "effect 2"]);

    root.unmount().expect("unmount");
    root.pump_until_idle().expect("pump");
    assert_eq!(take_log(), vec!["cleanup 2"]);
}

#[test]
fn keyed_reorder_preserves_node_identity() {
    let order = Rc::new(RefCell::new(vec!["A", "B", "C"]));
    let mut root = TestRoot::new();
    root.set_content({
        let order = Rc::clone(&order);
        move || {
            let items: Vec<VNode> = order
                .borrow()
                .iter()
                .map(|&name| create_element("li", Config::new().key(name), [name]))
                .collect();
            create_element("ol", Config::new(), items)
        }
    })
    .expect("install content");
    let before = root.find_by_tag("li");
    root.take_mutations();

    *order.borrow_mut() = vec!["C", "A", "B"];
    root.rerender().expect("reorder");
    let after = root.find_by_tag("li");
    assert_eq!(after, vec![before[2], before[0], before[1]]);
    assert_text(&root, "CAB");
    let records = root.take_mutations();
    assert!(
        records.iter().all(|record| matches!(record, MutationRecord::ChildList { .. })),
        "a reorder only moves nodes: {records:?}"
    );
}

struct Panel;

impl Component for Panel {
    type State = ();

    fn create(_props: &Props) -> Self {
        Panel
    }

    fn initial_state(&self, _props: &Props) -> Self::State {}

    fn render(&self, _cx: &ClassContext<'_, Self>) -> VNode {
        create_element("aside", Config::new(), ["panel"])
    }

    fn did_mount(&mut self, _cx: &ClassContext<'_, Self>) {
        log("panel mounted");
    }

    fn will_unmount(&mut self, _cx: &ClassContext<'_, Self>) {
        log("panel unmounting");
    }
}

fn child(_props: &Props) -> VNode {
    use_effect(|| {
        log("child effect");
        EffectCleanup::new(|| log("child cleanup"))
    });
    create_element("b", Config::new(), ["child"])
}

const CHILD: FunctionComponent = FunctionComponent::new("Child", child);

fn parent(_props: &Props) -> VNode {
    use_effect(|| {
        log("parent effect");
        EffectCleanup::new(|| log("parent cleanup"))
    });
    create_element(
        "section",
        Config::new(),
        [
            component(CHILD),
            create_element(class::<Panel>(), Config::new(), std::iter::empty::<Child>()),
        ],
    )
}

const PARENT: FunctionComponent = FunctionComponent::new("Parent", parent);

#[test]
fn mount_and_unmount_run_lifecycle_in_order() {
    reset();
    let mut root = TestRoot::new();
    root.set_content(|| component(PARENT)).expect("install content");
    assert_eq!(take_log(), vec!["panel mounted"]);
    root.pump_until_idle().expect("pump");
    assert_eq!(take_log(), vec!["parent effect", "child effect"]);
    assert_eq!(root.runtime().registry().len(), 2);

    root.unmount().expect("unmount");
    assert_eq!(take_log(), vec!["panel unmounting"]);
    assert!(root.find_by_tag("section").is_empty());
    assert_eq!(root.runtime().registry().len(), 2, "entries survive until the flush");

    root.pump_until_idle().expect("pump");
    assert_eq!(take_log(), vec!["child cleanup", "parent cleanup"]);
    assert!(root.runtime().registry().is_empty());
}
