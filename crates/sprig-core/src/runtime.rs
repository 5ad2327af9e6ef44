use crate::class::ClassCell;
use crate::collections::map::HashSet;
use crate::config::RuntimeConfig;
use crate::hooks::{self, PendingEffect};
use crate::platform::{FlushScheduler, ManualFlush};
use crate::props::{Key, Props};
use crate::registry::{ComponentInstance, IdentityKey, Registry};
use crate::store::SharedStore;
use crate::vnode::FunctionComponent;
use crate::NodeId;
use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Owner of a queued re-render.
pub(crate) enum RenderTask {
    Function(Weak<ComponentInstance>),
    Class(Weak<ClassCell>),
}

struct RuntimeInner {
    config: RuntimeConfig,
    scheduler: Arc<dyn FlushScheduler>,
    registry: RefCell<Registry>,
    store: SharedStore,
    queued_renders: RefCell<HashSet<usize>>,
    render_queue: RefCell<Vec<(usize, RenderTask)>>,
    effects: RefCell<Vec<PendingEffect>>,
    teardowns: RefCell<Vec<Weak<ComponentInstance>>>,
    flush_requested: Cell<bool>,
    flush_requests: Cell<usize>,
}

impl RuntimeInner {
    fn new(config: RuntimeConfig, scheduler: Arc<dyn FlushScheduler>, store: SharedStore) -> Self {
        Self {
            config,
            scheduler,
            registry: RefCell::new(Registry::new()),
            store,
            queued_renders: RefCell::new(HashSet::default()),
            render_queue: RefCell::new(Vec::new()),
            effects: RefCell::new(Vec::new()),
            teardowns: RefCell::new(Vec::new()),
            flush_requested: Cell::new(false),
            flush_requests: Cell::new(0),
        }
    }

    /// Asks the host for a flush on the idle → busy transition.
    fn request_flush(&self) {
        if !self.flush_requested.replace(true) {
            self.flush_requests.set(self.flush_requests.get() + 1);
            self.scheduler.request_flush();
        }
    }

    fn schedule_render(&self, id: usize, task: RenderTask) {
        if self.queued_renders.borrow_mut().insert(id) {
            self.render_queue.borrow_mut().push((id, task));
            self.request_flush();
        }
    }

    /// Withdraws a queued render. A later request queues it again at the
    /// back, not at its old position.
    fn cancel_render(&self, id: usize) {
        if self.queued_renders.borrow_mut().remove(&id) {
            self.render_queue.borrow_mut().retain(|(queued, _)| *queued != id);
        }
    }

    fn take_render_queue(&self) -> Vec<RenderTask> {
        let pending: Vec<_> = self.render_queue.borrow_mut().drain(..).collect();
        let mut queued = self.queued_renders.borrow_mut();
        pending
            .into_iter()
            .filter(|(id, _)| queued.remove(id))
            .map(|(_, task)| task)
            .collect()
    }

    fn has_queued_renders(&self) -> bool {
        !self.queued_renders.borrow().is_empty()
    }

    fn enqueue_effect(&self, effect: PendingEffect) {
        let mut effects = self.effects.borrow_mut();
        // a newer render of the same slot supersedes the older callback
        effects.retain(|queued| !(queued.owner == effect.owner && queued.slot == effect.slot));
        effects.push(effect);
        drop(effects);
        self.request_flush();
    }

    fn enqueue_teardown(&self, instance: &Rc<ComponentInstance>) {
        self.teardowns.borrow_mut().push(Rc::downgrade(instance));
        self.request_flush();
    }

    fn has_pending_work(&self) -> bool {
        self.has_queued_renders()
            || !self.effects.borrow().is_empty()
            || !self.teardowns.borrow().is_empty()
    }
}

/// Services shared by every renderer built on it: the instance registry, the
/// shared store and the deferred-work queue.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_scheduler(config, Arc::new(ManualFlush))
    }

    pub fn with_scheduler(config: RuntimeConfig, scheduler: Arc<dyn FlushScheduler>) -> Self {
        Self::with_store(config, scheduler, SharedStore::new())
    }

    /// Builds a runtime around an existing store, so several runtimes can
    /// observe the same shared state.
    pub fn with_store(
        config: RuntimeConfig,
        scheduler: Arc<dyn FlushScheduler>,
        store: SharedStore,
    ) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(config, scheduler, store)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn store(&self) -> SharedStore {
        self.inner.store.clone()
    }

    pub fn registry(&self) -> Ref<'_, Registry> {
        self.inner.registry.borrow()
    }

    pub fn instance(&self, identity: &IdentityKey) -> Option<Rc<ComponentInstance>> {
        self.inner.registry.borrow().get_instance(identity)
    }

    /// Registers a new instance. A still-mounted instance displaced from the
    /// same key is retired like an unmounted one.
    pub(crate) fn create_instance(
        &self,
        component: FunctionComponent,
        props: Props,
        key: Option<&Key>,
        container: NodeId,
    ) -> Rc<ComponentInstance> {
        let (instance, displaced) = self
            .inner
            .registry
            .borrow_mut()
            .insert_instance(component, props, key, container);
        if let Some(previous) = displaced {
            self.retire(&previous);
        }
        instance
    }

    /// Marks the instance removed now and queues its teardown for the next
    /// flush. Returns `false` if it was absent or already removed.
    pub fn remove_instance(&self, identity: &IdentityKey) -> bool {
        let removed = self.inner.registry.borrow().remove_instance(identity);
        match removed {
            Some(instance) => {
                self.inner.cancel_render(instance.id());
                self.inner.enqueue_teardown(&instance);
                true
            }
            None => false,
        }
    }

    /// Removes a specific instance, which may no longer be the one
    /// registered under its identity.
    pub(crate) fn retire(&self, instance: &Rc<ComponentInstance>) {
        let registered = self
            .instance(instance.identity())
            .is_some_and(|current| Rc::ptr_eq(&current, instance));
        if registered {
            self.remove_instance(instance.identity());
        } else if instance.mark_removed() {
            self.inner.cancel_render(instance.id());
            self.inner.enqueue_teardown(instance);
        }
    }

    pub fn has_pending_work(&self) -> bool {
        self.inner.has_pending_work()
    }

    pub fn pending_renders(&self) -> usize {
        self.inner.queued_renders.borrow().len()
    }

    /// Idle → busy transitions reported to the [`FlushScheduler`].
    pub fn flush_requests(&self) -> usize {
        self.inner.flush_requests.get()
    }

    pub(crate) fn begin_flush_pass(&self) {
        self.inner.flush_requested.set(false);
    }

    pub(crate) fn take_render_queue(&self) -> Vec<RenderTask> {
        self.inner.take_render_queue()
    }

    pub(crate) fn take_effects(&self) -> Vec<PendingEffect> {
        std::mem::take(&mut *self.inner.effects.borrow_mut())
    }

    /// Runs every queued teardown. Returns `(instances, cleanups)`.
    pub(crate) fn run_teardowns(&self) -> (usize, usize) {
        let pending = std::mem::take(&mut *self.inner.teardowns.borrow_mut());
        let mut instances = 0;
        let mut cleanups = 0;
        for instance in pending.iter().filter_map(Weak::upgrade) {
            cleanups += hooks::teardown(&instance);
            if self.inner.registry.borrow_mut().release(&instance) {
                log::trace!("released instance {}", instance.identity());
            }
            instances += 1;
        }
        (instances, cleanups)
    }

    pub(crate) fn cancel_render(&self, id: usize) {
        self.inner.cancel_render(id);
    }

    pub(crate) fn record_anomaly(&self) {
        self.inner.registry.borrow_mut().record_anomaly();
    }
}

/// Weak handle to a [`Runtime`] held by setters and subscriptions. Every
/// operation is a no-op once the runtime is gone.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl RuntimeHandle {
    pub fn upgrade(&self) -> Option<Runtime> {
        self.inner.upgrade().map(|inner| Runtime { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Queues `instance` if its state differs from what it last rendered, and
    /// withdraws it otherwise.
    pub(crate) fn invalidate(&self, instance: &Rc<ComponentInstance>) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if instance.needs_render() {
            inner.schedule_render(instance.id(), RenderTask::Function(Rc::downgrade(instance)));
        } else {
            log::trace!("state of {} restored, withdrawing re-render", instance.identity());
            inner.cancel_render(instance.id());
        }
    }

    /// Queues `instance` regardless of its local state.
    pub(crate) fn force_render(&self, instance: &Rc<ComponentInstance>) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if instance.is_removed() {
            return;
        }
        instance.mark_forced();
        inner.schedule_render(instance.id(), RenderTask::Function(Rc::downgrade(instance)));
    }

    pub(crate) fn schedule_class(&self, cell: &Rc<ClassCell>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule_render(cell.id(), RenderTask::Class(Rc::downgrade(cell)));
        }
    }

    pub(crate) fn enqueue_effect(&self, effect: PendingEffect) {
        if let Some(inner) = self.inner.upgrade() {
            inner.enqueue_effect(effect);
        }
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
