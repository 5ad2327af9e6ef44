//! Persistent identity for function components.

use crate::collections::map::HashMap;
use crate::hooks::HookSlot;
use crate::props::{Key, Props};
use crate::vnode::{FunctionComponent, VNode};
use crate::NodeId;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_INSTANCE_ID: AtomicUsize = AtomicUsize::new(1);

pub(crate) fn next_instance_id() -> usize {
    NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Registry key of an instance: `name:key` for keyed nodes, `name#n` for
/// unkeyed ones, where `n` comes from a counter that only grows.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(Rc<str>);

impl IdentityKey {
    pub fn keyed(component: &FunctionComponent, key: &Key) -> Self {
        Self(Rc::from(format!("{}:{key}", component.name())))
    }

    fn ordinal(component: &FunctionComponent, ordinal: u64) -> Self {
        Self(Rc::from(format!("{}#{ordinal}", component.name())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({})", self.0)
    }
}

/// Per-instance record of a mounted function component.
pub struct ComponentInstance {
    id: usize,
    identity: IdentityKey,
    component: FunctionComponent,
    props: RefCell<Props>,
    container: Cell<NodeId>,
    /// Shared with the mounted node, so the output outlives a displaced
    /// instance and can still be unmounted.
    rendered: Rc<RefCell<Option<VNode>>>,
    pub(crate) hooks: RefCell<Vec<HookSlot>>,
    removed: Cell<bool>,
    forced: Cell<bool>,
    render_count: Cell<usize>,
}

impl ComponentInstance {
    fn new(identity: IdentityKey, component: FunctionComponent, props: Props, container: NodeId) -> Self {
        Self {
            id: next_instance_id(),
            identity,
            component,
            props: RefCell::new(props),
            container: Cell::new(container),
            rendered: Rc::new(RefCell::new(None)),
            hooks: RefCell::new(Vec::new()),
            removed: Cell::new(false),
            forced: Cell::new(false),
            render_count: Cell::new(0),
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub fn identity(&self) -> &IdentityKey {
        &self.identity
    }

    pub fn component(&self) -> FunctionComponent {
        self.component
    }

    pub fn container(&self) -> NodeId {
        self.container.get()
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    /// How many times the render function has been invoked for this instance.
    pub fn render_count(&self) -> usize {
        self.render_count.get()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.borrow().len()
    }

    pub(crate) fn output(&self) -> Rc<RefCell<Option<VNode>>> {
        Rc::clone(&self.rendered)
    }

    pub(crate) fn with_props<R>(&self, f: impl FnOnce(&Props) -> R) -> R {
        f(&self.props.borrow())
    }

    pub(crate) fn take_rendered(&self) -> Option<VNode> {
        self.rendered.borrow_mut().take()
    }

    pub(crate) fn set_rendered(&self, rendered: Option<VNode>) {
        *self.rendered.borrow_mut() = rendered;
    }

    /// Returns `true` when this call made the transition.
    pub(crate) fn mark_removed(&self) -> bool {
        !self.removed.replace(true)
    }

    pub(crate) fn mark_forced(&self) {
        self.forced.set(true);
    }

    /// Whether a queued re-render would observe anything new: a forced
    /// refresh, or a state slot that differs from what was last rendered.
    pub(crate) fn needs_render(&self) -> bool {
        if self.forced.get() {
            return true;
        }
        match self.hooks.try_borrow() {
            Ok(hooks) => hooks.iter().any(HookSlot::is_dirty),
            Err(_) => true,
        }
    }

    /// Resets per-render bookkeeping ahead of an invocation.
    pub(crate) fn begin_render(&self) {
        self.forced.set(false);
        self.render_count.set(self.render_count.get() + 1);
        for slot in self.hooks.borrow_mut().iter_mut() {
            slot.commit();
        }
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("identity", &self.identity)
            .field("container", &self.container.get())
            .field("hooks", &self.hook_count())
            .field("removed", &self.removed.get())
            .finish()
    }
}

/// Fields merged into an existing instance by [`Registry::update_instance`].
#[derive(Default)]
pub struct InstanceUpdate {
    pub props: Option<Props>,
    pub container: Option<NodeId>,
    pub rendered: Option<Option<VNode>>,
}

impl InstanceUpdate {
    pub fn props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    pub fn container(mut self, container: NodeId) -> Self {
        self.container = Some(container);
        self
    }

    pub fn rendered(mut self, rendered: Option<VNode>) -> Self {
        self.rendered = Some(rendered);
        self
    }
}

/// Owns every live [`ComponentInstance`]. Everything else holds weak
/// references or identity keys.
#[derive(Default)]
pub struct Registry {
    instances: HashMap<IdentityKey, Rc<ComponentInstance>>,
    /// Instances pushed out of their key by a newer one, held until released.
    displaced: Vec<Rc<ComponentInstance>>,
    next_ordinal: u64,
    anomalies: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the identity for a new instance. Unkeyed identities consume a
    /// counter value, so they can only be recovered from the mounted node.
    pub fn identity_for(&mut self, component: &FunctionComponent, key: Option<&Key>) -> IdentityKey {
        match key {
            Some(key) => IdentityKey::keyed(component, key),
            None => {
                self.next_ordinal += 1;
                IdentityKey::ordinal(component, self.next_ordinal)
            }
        }
    }

    pub fn create_instance(
        &mut self,
        component: FunctionComponent,
        props: Props,
        key: Option<&Key>,
        container: NodeId,
    ) -> Rc<ComponentInstance> {
        let (instance, displaced) = self.insert_instance(component, props, key, container);
        if let Some(previous) = displaced {
            previous.mark_removed();
            self.release(&previous);
        }
        instance
    }

    /// Registers a new instance and hands back the still-mounted instance it
    /// displaced from the same key, if any. The registry keeps the displaced
    /// one until it is released; the caller owns its teardown.
    pub(crate) fn insert_instance(
        &mut self,
        component: FunctionComponent,
        props: Props,
        key: Option<&Key>,
        container: NodeId,
    ) -> (Rc<ComponentInstance>, Option<Rc<ComponentInstance>>) {
        let identity = self.identity_for(&component, key);
        let instance = Rc::new(ComponentInstance::new(identity.clone(), component, props, container));
        let displaced = self
            .instances
            .insert(identity.clone(), Rc::clone(&instance))
            .filter(|previous| !previous.is_removed());
        if let Some(previous) = &displaced {
            log::warn!("{identity} registered while an earlier instance is still mounted");
            self.displaced.push(Rc::clone(previous));
        }
        log::trace!("created instance {identity}");
        (instance, displaced)
    }

    pub fn get_instance(&self, identity: &IdentityKey) -> Option<Rc<ComponentInstance>> {
        self.instances.get(identity).cloned()
    }

    /// Looks up a keyed instance by component and key.
    pub fn find(&self, component: &FunctionComponent, key: &Key) -> Option<Rc<ComponentInstance>> {
        self.get_instance(&IdentityKey::keyed(component, key))
    }

    /// Merges `update` into the record in place. Returns `false` if no
    /// instance is registered under `identity`.
    pub fn update_instance(&self, identity: &IdentityKey, update: InstanceUpdate) -> bool {
        let Some(instance) = self.instances.get(identity) else {
            return false;
        };
        if let Some(props) = update.props {
            *instance.props.borrow_mut() = props;
        }
        if let Some(container) = update.container {
            instance.container.set(container);
        }
        if let Some(rendered) = update.rendered {
            *instance.rendered.borrow_mut() = rendered;
        }
        true
    }

    /// Marks the instance removed. Returns it when this call made the
    /// transition, so the caller can queue its teardown.
    pub fn remove_instance(&self, identity: &IdentityKey) -> Option<Rc<ComponentInstance>> {
        let instance = self.instances.get(identity)?;
        if !instance.mark_removed() {
            return None;
        }
        log::trace!("removed instance {identity}");
        Some(Rc::clone(instance))
    }

    /// Drops the entry for `instance`, unless the key has since been taken
    /// by a newer instance.
    pub(crate) fn release(&mut self, instance: &Rc<ComponentInstance>) -> bool {
        self.displaced.retain(|held| !Rc::ptr_eq(held, instance));
        match self.instances.get(&instance.identity) {
            Some(current) if Rc::ptr_eq(current, instance) => {
                self.instances.remove(&instance.identity);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, identity: &IdentityKey) -> bool {
        self.instances.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub(crate) fn record_anomaly(&mut self) {
        self.anomalies += 1;
    }

    /// Update-path lookups that found no instance.
    pub fn anomalies(&self) -> usize {
        self.anomalies
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
