//! Hook primitives for function components.
//!
//! Every hook claims the next slot of the rendering instance. Slot `i`
//! always belongs to the `i`-th hook call of a render, so hooks must be
//! called unconditionally and in the same order on every render.

use crate::mutable_ref::MutableRef;
use crate::registry::ComponentInstance;
use crate::render_context::{self, RenderFrame};
use crate::runtime::RuntimeHandle;
use crate::store::{SharedStore, Subscription};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

pub(crate) enum HookSlot {
    State(Box<dyn StateCell>),
    Effect(EffectSlot),
    Memo(MemoSlot),
    Ref(Box<dyn Any>),
    Shared(SharedSlot),
}

impl HookSlot {
    fn kind(&self) -> &'static str {
        match self {
            HookSlot::State(_) => "use_state",
            HookSlot::Effect(_) => "use_effect",
            HookSlot::Memo(_) => "use_memo",
            HookSlot::Ref(_) => "use_ref",
            HookSlot::Shared(_) => "use_shared_state",
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        match self {
            HookSlot::State(cell) => cell.is_dirty(),
            _ => false,
        }
    }

    pub(crate) fn commit(&mut self) {
        if let HookSlot::State(cell) = self {
            cell.commit();
        }
    }
}

pub(crate) trait StateCell {
    fn is_dirty(&self) -> bool;
    fn commit(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Current value plus the value the instance last rendered with.
struct StateSlot<T> {
    value: T,
    committed: T,
}

impl<T: Clone> StateSlot<T> {
    fn new(value: T) -> Self {
        Self {
            committed: value.clone(),
            value,
        }
    }
}

impl<T: Clone + PartialEq + 'static> StateCell for StateSlot<T> {
    fn is_dirty(&self) -> bool {
        self.value != self.committed
    }

    fn commit(&mut self) {
        self.committed = self.value.clone();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
pub(crate) struct EffectSlot {
    deps: Option<Box<dyn Any>>,
    cleanup: Option<EffectCleanup>,
}

#[derive(Default)]
pub(crate) struct MemoSlot {
    deps: Option<Box<dyn Any>>,
    value: Option<Box<dyn Any>>,
}

pub(crate) struct SharedSlot {
    subscription: Subscription,
}

impl RenderFrame {
    /// Claims the next slot, creating it with `init` on first use, and reads
    /// it with `access`. `access` returning `None` means the slot belongs to a
    /// different hook.
    fn slot<R>(
        &self,
        hook: &'static str,
        init: impl FnOnce() -> HookSlot,
        access: impl FnOnce(&mut HookSlot) -> Option<R>,
    ) -> (usize, R) {
        let index = self.advance();
        let existing = self.instance.hooks.borrow().len();
        if index >= existing {
            if self.expected_slots.is_some() {
                panic!(
                    "hook order changed in {}: {hook} claimed slot {index} that the previous render did not use",
                    self.instance.identity()
                );
            }
            // init may run user code, so it must not overlap the borrow below
            let slot = init();
            self.instance.hooks.borrow_mut().push(slot);
        }
        let mut hooks = self.instance.hooks.borrow_mut();
        let slot = &mut hooks[index];
        let kind = slot.kind();
        match access(slot) {
            Some(value) => (index, value),
            None => panic!(
                "hook order changed in {}: slot {index} holds a {kind} hook but {hook} was called",
                self.instance.identity()
            ),
        }
    }
}

/// Verifies the render consumed every slot of the previous render.
pub(crate) fn finish_render(frame: &RenderFrame) {
    if let Some(expected) = frame.expected_slots {
        let used = frame.cursor.get();
        if used < expected {
            panic!(
                "hook order changed in {}: rendered {used} hooks, previous render used {expected}",
                frame.instance.identity()
            );
        }
    }
}

/// Per-position comparison of dependency values. A previous value of
/// another type (different arity included) counts as changed.
fn deps_changed<D: PartialEq + 'static>(previous: Option<&dyn Any>, next: &D) -> bool {
    match previous.and_then(|previous| previous.downcast_ref::<D>()) {
        Some(previous) => previous != next,
        None => true,
    }
}

/// Returns the current value of a state slot and a setter for it.
///
/// `initial` runs on the first render only.
pub fn use_state<T>(initial: impl FnOnce() -> T) -> (T, StateSetter<T>)
where
    T: Clone + PartialEq + 'static,
{
    render_context::with_frame("use_state", |frame| {
        let (slot, value) = frame.slot(
            "use_state",
            || HookSlot::State(Box::new(StateSlot::new(initial()))),
            |slot| match slot {
                HookSlot::State(cell) => cell
                    .as_any()
                    .downcast_ref::<StateSlot<T>>()
                    .map(|state| state.value.clone()),
                _ => None,
            },
        );
        let setter = StateSetter {
            instance: Rc::downgrade(&frame.instance),
            runtime: frame.runtime.clone(),
            slot,
            _marker: PhantomData,
        };
        (value, setter)
    })
}

/// Writes to one `use_state` slot and schedules the owning instance.
pub struct StateSetter<T> {
    instance: Weak<ComponentInstance>,
    runtime: RuntimeHandle,
    slot: usize,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            instance: Weak::clone(&self.instance),
            runtime: self.runtime.clone(),
            slot: self.slot,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter").field("slot", &self.slot).finish()
    }
}

impl<T: Clone + PartialEq + 'static> StateSetter<T> {
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Computes the next value from the current one. An equal result
    /// schedules nothing.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let Some(instance) = self.instance.upgrade() else {
            log::warn!("state update after the component was dropped");
            return;
        };
        if instance.is_removed() {
            log::warn!("state update on unmounted component {}", instance.identity());
            return;
        }
        let Some(current) = self.read(&instance) else {
            return;
        };
        let next = f(&current);
        if next == current {
            return;
        }
        let mut hooks = instance.hooks.borrow_mut();
        if let Some(HookSlot::State(cell)) = hooks.get_mut(self.slot) {
            if let Some(state) = cell.as_any_mut().downcast_mut::<StateSlot<T>>() {
                state.value = next;
            }
        }
        drop(hooks);
        self.runtime.invalidate(&instance);
    }

    /// Latest value written to the slot, rendered or not.
    pub fn get(&self) -> Option<T> {
        let instance = self.instance.upgrade()?;
        self.read(&instance)
    }

    fn read(&self, instance: &ComponentInstance) -> Option<T> {
        let hooks = instance.hooks.borrow();
        match hooks.get(self.slot) {
            Some(HookSlot::State(cell)) => cell
                .as_any()
                .downcast_ref::<StateSlot<T>>()
                .map(|state| state.value.clone()),
            _ => None,
        }
    }
}

/// Teardown returned by an effect. `()` converts to "nothing to clean up".
#[derive(Default)]
pub struct EffectCleanup(Option<Box<dyn FnOnce()>>);

impl EffectCleanup {
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(cleanup)))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub(crate) fn run(self) -> bool {
        match self.0 {
            Some(cleanup) => {
                cleanup();
                true
            }
            None => false,
        }
    }
}

impl From<()> for EffectCleanup {
    fn from(_: ()) -> Self {
        Self::none()
    }
}

impl fmt::Debug for EffectCleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() { "EffectCleanup(..)" } else { "EffectCleanup(none)" })
    }
}

/// An effect waiting for the next flush.
pub(crate) struct PendingEffect {
    pub(crate) instance: Weak<ComponentInstance>,
    pub(crate) owner: usize,
    pub(crate) slot: usize,
    callback: Box<dyn FnOnce() -> EffectCleanup>,
}

impl PendingEffect {
    fn live_instance(&self) -> Option<Rc<ComponentInstance>> {
        self.instance.upgrade().filter(|instance| !instance.is_removed())
    }

    /// Runs the cleanup left by the slot's previous effect, if any.
    pub(crate) fn run_cleanup(&self) -> bool {
        let Some(instance) = self.live_instance() else {
            return false;
        };
        let cleanup = match instance.hooks.borrow_mut().get_mut(self.slot) {
            Some(HookSlot::Effect(effect)) => effect.cleanup.take(),
            _ => None,
        };
        cleanup.is_some_and(EffectCleanup::run)
    }

    pub(crate) fn run(self) -> bool {
        let Some(instance) = self.live_instance() else {
            return false;
        };
        let cleanup = (self.callback)();
        if let Some(HookSlot::Effect(effect)) = instance.hooks.borrow_mut().get_mut(self.slot) {
            effect.cleanup = Some(cleanup);
        }
        true
    }
}

fn schedule_effect<D, C>(hook: &'static str, deps: Option<D>, callback: impl FnOnce() -> C + 'static)
where
    D: PartialEq + 'static,
    C: Into<EffectCleanup>,
{
    render_context::with_frame(hook, |frame| {
        let (slot, should_run) = frame.slot(
            hook,
            || HookSlot::Effect(EffectSlot::default()),
            |slot| match slot {
                HookSlot::Effect(effect) => Some(match deps {
                    None => {
                        effect.deps = None;
                        true
                    }
                    Some(deps) => {
                        let changed = deps_changed(effect.deps.as_deref(), &deps);
                        if changed {
                            effect.deps = Some(Box::new(deps));
                        }
                        changed
                    }
                }),
                _ => None,
            },
        );
        if should_run {
            frame.runtime.enqueue_effect(PendingEffect {
                instance: Rc::downgrade(&frame.instance),
                owner: frame.instance.id(),
                slot,
                callback: Box::new(move || callback().into()),
            });
        }
    });
}

/// Runs `callback` after every render, once the live tree reflects it.
pub fn use_effect<C: Into<EffectCleanup>>(callback: impl FnOnce() -> C + 'static) {
    schedule_effect::<(), C>("use_effect", None, callback);
}

/// Runs `callback` after a render whose `deps` differ from the previous
/// render's. `()` runs it once, after the first mount. The previous cleanup
/// runs first.
pub fn use_effect_with<D, C>(deps: D, callback: impl FnOnce() -> C + 'static)
where
    D: PartialEq + 'static,
    C: Into<EffectCleanup>,
{
    schedule_effect("use_effect_with", Some(deps), callback);
}

/// Returns the cached result of `factory`, recomputed only when `deps`
/// change.
pub fn use_memo<D, T>(deps: D, factory: impl FnOnce() -> T) -> T
where
    D: PartialEq + 'static,
    T: Clone + 'static,
{
    render_context::with_frame("use_memo", |frame| {
        let (slot, cached) = frame.slot(
            "use_memo",
            || HookSlot::Memo(MemoSlot::default()),
            |slot| match slot {
                HookSlot::Memo(memo) => Some(if deps_changed(memo.deps.as_deref(), &deps) {
                    None
                } else {
                    memo.value
                        .as_ref()
                        .and_then(|value| value.downcast_ref::<T>())
                        .cloned()
                }),
                _ => None,
            },
        );
        if let Some(value) = cached {
            return value;
        }
        let value = factory();
        if let Some(HookSlot::Memo(memo)) = frame.instance.hooks.borrow_mut().get_mut(slot) {
            memo.deps = Some(Box::new(deps));
            memo.value = Some(Box::new(value.clone()));
        }
        value
    })
}

/// Returns a box that survives re-renders. Writing to it schedules nothing.
pub fn use_ref<T: 'static>(initial: impl FnOnce() -> T) -> MutableRef<T> {
    render_context::with_frame("use_ref", |frame| {
        frame
            .slot(
                "use_ref",
                || HookSlot::Ref(Box::new(MutableRef::new(initial()))),
                |slot| match slot {
                    HookSlot::Ref(value) => value.downcast_ref::<MutableRef<T>>().cloned(),
                    _ => None,
                },
            )
            .1
    })
}

/// State stored in the runtime's [`SharedStore`] under `key`. Every instance
/// using the key re-renders when any of them, or anything else, changes it.
pub fn use_shared_state<T>(key: &str, initial: impl FnOnce() -> T) -> (T, SharedSetter<T>)
where
    T: Clone + PartialEq + 'static,
{
    render_context::with_frame("use_shared_state", |frame| {
        if !frame.store.contains(key) {
            frame.store.set(key, initial());
        }
        let subscribe = || {
            let instance = Rc::downgrade(&frame.instance);
            let runtime = frame.runtime.clone();
            frame.store.subscribe(key, move || {
                if let Some(instance) = instance.upgrade() {
                    runtime.force_render(&instance);
                }
            })
        };
        let (slot, stale) = frame.slot(
            "use_shared_state",
            || HookSlot::Shared(SharedSlot { subscription: subscribe() }),
            |slot| match slot {
                HookSlot::Shared(shared) => Some(shared.subscription.key() != key),
                _ => None,
            },
        );
        if stale {
            let subscription = subscribe();
            if let Some(HookSlot::Shared(shared)) = frame.instance.hooks.borrow_mut().get_mut(slot) {
                shared.subscription = subscription;
            }
        }
        let Some(value) = frame.store.get::<T>(key) else {
            panic!(
                "shared state {key:?} holds a value that is not a {}",
                std::any::type_name::<T>()
            );
        };
        let setter = SharedSetter {
            store: frame.store.clone(),
            key: Rc::from(key),
            _marker: PhantomData,
        };
        (value, setter)
    })
}

/// Writes one key of the shared store.
pub struct SharedSetter<T> {
    store: SharedStore,
    key: Rc<str>,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for SharedSetter<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: Rc::clone(&self.key),
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + PartialEq + 'static> SharedSetter<T> {
    pub fn set(&self, value: T) -> bool {
        self.store.set(&self.key, value)
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        match self.store.get::<T>(&self.key) {
            Some(current) => self.set(f(&current)),
            None => false,
        }
    }

    pub fn get(&self) -> Option<T> {
        self.store.get(&self.key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Runs effect cleanups and releases subscriptions of a removed instance.
/// Returns the number of cleanups that ran.
pub(crate) fn teardown(instance: &ComponentInstance) -> usize {
    let slots = std::mem::take(&mut *instance.hooks.borrow_mut());
    let mut cleanups = 0;
    for slot in slots {
        if let HookSlot::Effect(EffectSlot {
            cleanup: Some(cleanup),
            ..
        }) = slot
        {
            if cleanup.run() {
                cleanups += 1;
            }
        }
    }
    cleanups
}

#[cfg(test)]
#[path = "tests/hooks_tests.rs"]
mod tests;
