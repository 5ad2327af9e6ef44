use super::*;
use crate::{create_element, Child, Config, Event, MemoryDocument, Renderer, Runtime};
use std::cell::RefCell;

thread_local! {
    static LIFECYCLE: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static UPDATER: RefCell<Option<Updater<i32>>> = const { RefCell::new(None) };
}

fn record(entry: String) {
    LIFECYCLE.with(|log| log.borrow_mut().push(entry));
}

fn take_lifecycle() -> Vec<String> {
    LIFECYCLE.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

struct Clicker {
    step: i32,
}

impl Component for Clicker {
    type State = i32;

    fn create(props: &Props) -> Self {
        Self {
            step: props.get_int("step").unwrap_or(1) as i32,
        }
    }

    fn initial_state(&self, props: &Props) -> i32 {
        props.get_int("start").unwrap_or(0) as i32
    }

    fn render(&self, cx: &ClassContext<'_, Self>) -> VNode {
        record(format!("render {}", cx.state()));
        UPDATER.with(|slot| *slot.borrow_mut() = Some(cx.updater().clone()));
        let updater = cx.updater().clone();
        let step = self.step;
        let label = cx.props().get_str("label").unwrap_or("count").to_string();
        create_element(
            "button",
            Config::new().on("click", move |_| updater.set_state(move |count| count + step)),
            [Child::from(format!("{label}: {}", cx.state()))],
        )
    }

    fn did_mount(&mut self, cx: &ClassContext<'_, Self>) {
        record(format!("mounted {}", cx.state()));
    }

    fn did_update(&mut self, cx: &ClassContext<'_, Self>, prev_props: &Props, prev_state: &i32) {
        record(format!(
            "updated {prev_state} -> {} ({} -> {})",
            cx.state(),
            prev_props.get_str("label").unwrap_or("count"),
            cx.props().get_str("label").unwrap_or("count"),
        ));
    }

    fn will_unmount(&mut self, cx: &ClassContext<'_, Self>) {
        record(format!("unmounting {}", cx.state()));
    }
}

fn clicker(config: Config) -> VNode {
    create_element(class::<Clicker>(), config, std::iter::empty::<Child>())
}

fn setup() -> (Renderer<MemoryDocument>, NodeId) {
    let mut document = MemoryDocument::new();
    let container = document.create_container("div");
    (Renderer::new(Runtime::default(), document), container)
}

fn updater() -> Updater<i32> {
    UPDATER.with(|slot| slot.borrow().clone().expect("clicker rendered"))
}

#[test]
fn class_name_comes_from_the_type() {
    assert_eq!(class::<Clicker>().name(), "Clicker");
    assert!(class::<Clicker>().same_type(&ClassComponent::of::<Clicker>()));
}

#[test]
fn mount_renders_then_reports_mounted() {
    take_lifecycle();
    let (mut renderer, container) = setup();
    renderer
        .render(clicker(Config::new().set("start", 5)), container)
        .expect("render");
    assert_eq!(take_lifecycle(), vec!["render 5", "mounted 5"]);
    assert_eq!(renderer.target().text_content(container), "count: 5");
}

#[test]
fn queued_updates_apply_in_order_with_one_render() {
    take_lifecycle();
    let (mut renderer, container) = setup();
    renderer.render(clicker(Config::new()), container).expect("render");
    take_lifecycle();

    let updater = updater();
    updater.set_state(|count| count + 1);
    updater.set_state(|count| count * 10);
    assert!(take_lifecycle().is_empty(), "updates wait for the flush");
    assert_eq!(renderer.runtime().pending_renders(), 1);

    let report = renderer.flush().expect("flush");
    assert_eq!(report.rerenders, 1);
    assert_eq!(take_lifecycle(), vec!["render 10", "updated 0 -> 10 (count -> count)"]);
    assert_eq!(renderer.target().text_content(container), "count: 10");
}

#[test]
fn clicks_flow_through_the_updater() {
    take_lifecycle();
    let (mut renderer, container) = setup();
    renderer
        .render(clicker(Config::new().set("step", 2)), container)
        .expect("render");
    let button = renderer.target().find_by_tag(container, "button")[0];

    renderer.target().dispatch_event(button, Event::new("click"));
    renderer.target().dispatch_event(button, Event::new("click"));
    renderer.flush().expect("flush");

    assert_eq!(renderer.target().text_content(container), "count: 4");
    assert_eq!(
        renderer.target().find_by_tag(container, "button"),
        vec![button],
        "the button is patched, not replaced"
    );
}

#[test]
fn new_props_reach_did_update() {
    take_lifecycle();
    let (mut renderer, container) = setup();
    renderer
        .render(clicker(Config::new().set("label", "apples")), container)
        .expect("render");
    take_lifecycle();

    renderer
        .render(clicker(Config::new().set("label", "pears")), container)
        .expect("render");
    assert_eq!(take_lifecycle(), vec!["render 0", "updated 0 -> 0 (apples -> pears)"]);
    assert_eq!(renderer.target().text_content(container), "pears: 0");
}

#[test]
fn unmount_runs_will_unmount_and_ignores_later_updates() {
    take_lifecycle();
    let (mut renderer, container) = setup();
    renderer.render(clicker(Config::new()), container).expect("render");
    let updater = updater();
    updater.replace(3);
    renderer.flush().expect("flush");
    take_lifecycle();

    assert!(renderer.unmount(container).expect("unmount"));
    assert_eq!(take_lifecycle(), vec!["unmounting 3"]);
    assert!(renderer.target().find_by_tag(container, "button").is_empty());

    updater.replace(7);
    assert!(!renderer.runtime().has_pending_work());
    assert!(take_lifecycle().is_empty());
}

#[test]
fn type_change_replaces_the_class_instance() {
    take_lifecycle();
    let (mut renderer, container) = setup();
    renderer.render(clicker(Config::new()), container).expect("render");
    take_lifecycle();

    renderer
        .render(create_element("span", Config::new(), ["plain"]), container)
        .expect("render");
    assert_eq!(take_lifecycle(), vec!["unmounting 0"]);
    assert_eq!(renderer.target().text_content(container), "plain");
}
