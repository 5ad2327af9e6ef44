use sprig_core::{
    Event, FlushReport, FlushScheduler, MemoryDocument, MutationRecord, NodeId, RenderError,
    RenderStats, RenderTarget, Renderer, Runtime, RuntimeConfig, VNode,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scheduler that only counts flush requests, so tests can assert on the
/// idle → busy transitions the runtime reported.
#[derive(Debug, Default)]
pub struct CountingFlush {
    requests: AtomicUsize,
}

impl CountingFlush {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl FlushScheduler for CountingFlush {
    fn request_flush(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Headless harness for exercising virtual trees in tests.
///
/// `TestRoot` owns a renderer over a [`MemoryDocument`] and one container
/// element. Content is installed as a closure so it can be rendered again
/// with [`rerender`](Self::rerender), the way an application re-renders its
/// root after outside changes. Deferred work only happens when the test asks
/// for it, through [`flush`](Self::flush) or
/// [`pump_until_idle`](Self::pump_until_idle).
pub struct TestRoot {
    renderer: Renderer<MemoryDocument>,
    container: NodeId,
    scheduler: Arc<CountingFlush>,
    content: Option<Box<dyn FnMut() -> VNode>>,
}

impl TestRoot {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let scheduler = Arc::new(CountingFlush::default());
        let runtime = Runtime::with_scheduler(config, scheduler.clone());
        let mut document = MemoryDocument::new();
        let container = document.create_container("div");
        document.clear_mutations();
        Self {
            renderer: Renderer::new(runtime, document),
            container,
            scheduler,
            content: None,
        }
    }

    /// Installs `content` and renders it into the container.
    pub fn set_content(&mut self, content: impl FnMut() -> VNode + 'static) -> Result<(), RenderError> {
        self.content = Some(Box::new(content));
        self.rerender()
    }

    /// Renders the installed content again, diffing against the current tree.
    pub fn rerender(&mut self) -> Result<(), RenderError> {
        if let Some(content) = self.content.as_mut() {
            let tree = content();
            self.renderer.render(tree, self.container)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<FlushReport, RenderError> {
        self.renderer.flush()
    }

    /// Flushes until the runtime reports no pending work. Returns the total
    /// number of re-renders performed.
    pub fn pump_until_idle(&mut self) -> Result<usize, RenderError> {
        let mut rerenders = 0;
        while self.renderer.runtime().has_pending_work() {
            let report = self.renderer.flush()?;
            log::trace!("pump_until_idle: {report:?}");
            rerenders += report.rerenders;
        }
        Ok(rerenders)
    }

    /// Removes the rendered tree. The installed content is kept.
    pub fn unmount(&mut self) -> Result<bool, RenderError> {
        self.renderer.unmount(self.container)
    }

    /// Dispatches `event` at `target` without flushing. Returns how many
    /// handlers ran.
    pub fn dispatch(&mut self, target: NodeId, event: Event) -> usize {
        self.renderer.target().dispatch_event(target, event)
    }

    /// Dispatches a `click` at `target` and pumps until idle.
    pub fn click(&mut self, target: NodeId) -> Result<usize, RenderError> {
        let handled = self.dispatch(target, Event::new("click"));
        if handled == 0 {
            log::warn!("click on #{target} reached no handler");
        }
        self.pump_until_idle()
    }

    /// Dispatches an `input` event carrying `value` and pumps until idle.
    pub fn input(&mut self, target: NodeId, value: &str) -> Result<usize, RenderError> {
        self.dispatch(target, Event::new("input").with_value(value));
        self.pump_until_idle()
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Text content of the whole container.
    pub fn text(&self) -> String {
        self.renderer.target().text_content(self.container)
    }

    pub fn document(&self) -> &MemoryDocument {
        self.renderer.target()
    }

    pub fn document_mut(&mut self) -> &mut MemoryDocument {
        self.renderer.target_mut()
    }

    pub fn renderer(&mut self) -> &mut Renderer<MemoryDocument> {
        &mut self.renderer
    }

    pub fn runtime(&self) -> &Runtime {
        self.renderer.runtime()
    }

    pub fn stats(&self) -> RenderStats {
        self.renderer.stats()
    }

    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        self.renderer.target_mut().take_mutations()
    }

    /// Flush requests reported by the runtime since this root was created.
    pub fn flush_requests(&self) -> usize {
        self.scheduler.requests()
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.document().find_by_tag(self.container, tag)
    }

    /// First element with `tag`.
    ///
    /// # Panics
    /// Panics when no such element is rendered.
    pub fn expect_tag(&self, tag: &str) -> NodeId {
        match self.find_by_tag(tag).first() {
            Some(&id) => id,
            None => panic!("no <{tag}> under the test root:\n{}", self.dump_tree()),
        }
    }

    /// Elements whose whole text content equals `text`, innermost first
    /// within each branch.
    pub fn find_by_text(&self, text: &str) -> Vec<NodeId> {
        let document = self.document();
        let mut matches: Vec<NodeId> = document
            .elements(self.container)
            .into_iter()
            .filter(|&id| document.text_content(id) == text)
            .collect();
        // drop ancestors of other matches
        let snapshot = matches.clone();
        matches.retain(|&id| {
            !snapshot
                .iter()
                .any(|&other| other != id && is_ancestor(document, id, other))
        });
        matches
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn dump_tree(&self) -> String {
        self.document().dump_tree(self.container)
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

fn is_ancestor(document: &MemoryDocument, ancestor: NodeId, node: NodeId) -> bool {
    let mut current = document.parent(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = document.parent(id);
    }
    false
}

/// Convenience helper for tests that only need temporary access to a
/// `TestRoot`.
pub fn run_test_root<R>(f: impl FnOnce(&mut TestRoot) -> R) -> R {
    let mut root = TestRoot::new();
    f(&mut root)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/end_to_end_tests.rs"]
mod end_to_end_tests;
