use super::*;
use crate::{
    create_element, use_effect_with, use_state, Child, Config, EffectCleanup, FunctionComponent,
    Key, MemoryDocument, NodeId, Props, Renderer, StateSetter, VNode,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};

#[derive(Default)]
struct CountingFlush {
    requests: AtomicUsize,
}

impl FlushScheduler for CountingFlush {
    fn request_flush(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

thread_local! {
    static SETTERS: RefCell<Vec<StateSetter<u32>>> = const { RefCell::new(Vec::new()) };
    static CLEANUPS: Cell<usize> = const { Cell::new(0) };
    static RENDERED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn tracked(props: &Props) -> VNode {
    let label = props.get_str("label").unwrap_or("?").to_string();
    RENDERED.with(|rendered| rendered.borrow_mut().push(label));
    let (value, set) = use_state(|| 0_u32);
    SETTERS.with(|setters| setters.borrow_mut().push(set));
    use_effect_with((), || {
        EffectCleanup::new(|| CLEANUPS.with(|count| count.set(count.get() + 1)))
    });
    create_element("span", Config::new(), [Child::from(value)])
}

const TRACKED: FunctionComponent = FunctionComponent::new("Tracked", tracked);

fn tracked_pair() -> VNode {
    create_element(
        "div",
        Config::new(),
        [
            create_element(
                TRACKED,
                Config::new().key("a").set("label", "a"),
                std::iter::empty::<Child>(),
            ),
            create_element(
                TRACKED,
                Config::new().key("b").set("label", "b"),
                std::iter::empty::<Child>(),
            ),
        ],
    )
}

fn setter(index: usize) -> StateSetter<u32> {
    SETTERS.with(|setters| setters.borrow()[index].clone())
}

fn mounted(runtime: Runtime) -> (Renderer<MemoryDocument>, NodeId) {
    SETTERS.with(|setters| setters.borrow_mut().clear());
    let mut document = MemoryDocument::new();
    let container = document.create_container("div");
    let mut renderer = Renderer::new(runtime, document);
    renderer.render(tracked_pair(), container).expect("render");
    renderer.flush().expect("flush");
    (renderer, container)
}

#[test]
fn one_flush_request_per_idle_to_busy_transition() {
    let scheduler = Arc::new(CountingFlush::default());
    let runtime = Runtime::with_scheduler(RuntimeConfig::default(), scheduler.clone());
    let (mut renderer, _container) = mounted(runtime);
    // the mount-time effects asked once
    assert_eq!(scheduler.requests.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.runtime().flush_requests(), 1);

    setter(0).set(1);
    setter(1).set(1);
    setter(0).set(2);
    assert_eq!(scheduler.requests.load(Ordering::SeqCst), 2);
    assert_eq!(renderer.runtime().pending_renders(), 2);

    renderer.flush().expect("flush");
    assert!(!renderer.runtime().has_pending_work());

    setter(1).set(5);
    assert_eq!(scheduler.requests.load(Ordering::SeqCst), 3);
}

#[test]
fn remove_instance_defers_teardown_to_the_flush() {
    CLEANUPS.with(|count| count.set(0));
    let (mut renderer, _container) = mounted(Runtime::default());
    let runtime = renderer.runtime().clone();
    let identity = IdentityKey::keyed(&TRACKED, &Key::from("a"));
    let instance = runtime.instance(&identity).expect("registered");

    assert!(runtime.remove_instance(&identity));
    assert!(instance.is_removed());
    assert!(!runtime.remove_instance(&identity), "second removal is a no-op");
    assert!(runtime.registry().contains(&identity), "entry survives until the flush");
    assert_eq!(CLEANUPS.with(Cell::get), 0);

    let report = renderer.flush().expect("flush");
    assert_eq!(report.teardowns, 1);
    assert_eq!(report.cleanups, 1);
    assert_eq!(CLEANUPS.with(Cell::get), 1);
    assert!(!runtime.registry().contains(&identity));
    assert_eq!(instance.hook_count(), 0);
}

#[test]
fn removed_instances_drop_their_queued_render() {
    let (mut renderer, _container) = mounted(Runtime::default());
    let runtime = renderer.runtime().clone();
    setter(0).set(9);
    assert_eq!(runtime.pending_renders(), 1);

    assert!(runtime.remove_instance(&IdentityKey::keyed(&TRACKED, &Key::from("a"))));
    assert_eq!(runtime.pending_renders(), 0);
    let report = renderer.flush().expect("flush");
    assert_eq!(report.rerenders, 0);
}

#[test]
fn requeued_render_goes_to_the_back_of_the_queue() {
    let (mut renderer, _container) = mounted(Runtime::default());
    let (a, b) = (setter(0), setter(1));
    RENDERED.with(|rendered| rendered.borrow_mut().clear());

    a.set(1);
    b.set(1);
    a.set(0);
    assert_eq!(renderer.runtime().pending_renders(), 1, "a was withdrawn");
    a.set(2);

    let report = renderer.flush().expect("flush");
    assert_eq!(report.rerenders, 2);
    assert_eq!(RENDERED.with(|rendered| rendered.borrow().clone()), vec!["b", "a"]);
}

/// Forwards flush requests to a host thread.
struct ChannelFlush(Mutex<mpsc::Sender<()>>);

impl FlushScheduler for ChannelFlush {
    fn request_flush(&self) {
        if let Ok(sender) = self.0.lock() {
            let _ = sender.send(());
        }
    }
}

#[test]
fn flush_requests_reach_a_host_thread() {
    let (sender, receiver) = mpsc::channel();
    let host = std::thread::spawn(move || receiver.recv().is_ok());
    let scheduler = Arc::new(ChannelFlush(Mutex::new(sender)));
    let (renderer, _container) = mounted(Runtime::with_scheduler(RuntimeConfig::default(), scheduler));
    assert!(host.join().expect("host thread"));
    assert_eq!(renderer.runtime().flush_requests(), 1);
}

#[test]
fn handles_die_with_the_runtime() {
    let runtime = Runtime::default();
    let handle = runtime.handle();
    assert!(handle.is_alive());
    assert!(handle.upgrade().is_some());
    drop(runtime);
    assert!(!handle.is_alive());
    assert!(handle.upgrade().is_none());
}

#[test]
fn runtimes_can_share_a_store() {
    let store = SharedStore::new();
    let first = Runtime::with_store(RuntimeConfig::default(), Arc::new(ManualFlush), store.clone());
    let second = Runtime::with_store(RuntimeConfig::default(), Arc::new(ManualFlush), store);
    first.store().set("theme", "dark".to_string());
    assert_eq!(second.store().get::<String>("theme").as_deref(), Some("dark"));
}

#[test]
fn flush_pass_limit_has_a_floor_of_one() {
    let config = RuntimeConfig::default().with_max_flush_passes(0);
    assert_eq!(config.max_flush_passes, 1);
    let runtime = Runtime::new(config.clone());
    assert_eq!(runtime.config(), &config);
}
