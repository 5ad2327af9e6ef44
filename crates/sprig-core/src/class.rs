//! Class-style components: a constructed object with engine-managed state
//! and lifecycle callbacks, retained on the mounted node across updates.

use crate::props::Props;
use crate::registry::next_instance_id;
use crate::runtime::RuntimeHandle;
use crate::vnode::VNode;
use crate::NodeId;
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

pub trait Component: Sized + 'static {
    type State: Clone + 'static;

    fn create(props: &Props) -> Self;

    fn initial_state(&self, props: &Props) -> Self::State;

    fn render(&self, cx: &ClassContext<'_, Self>) -> VNode;

    /// Runs once the first render is attached to the live tree.
    fn did_mount(&mut self, _cx: &ClassContext<'_, Self>) {}

    /// Runs after every committed update with the props and state the
    /// component had before it.
    fn did_update(&mut self, _cx: &ClassContext<'_, Self>, _prev_props: &Props, _prev_state: &Self::State) {}

    /// Runs before the component's subtree is removed.
    fn will_unmount(&mut self, _cx: &ClassContext<'_, Self>) {}
}

/// What a class component sees during render and lifecycle callbacks.
pub struct ClassContext<'a, C: Component> {
    props: &'a Props,
    state: &'a C::State,
    updater: &'a Updater<C::State>,
}

impl<'a, C: Component> ClassContext<'a, C> {
    pub fn props(&self) -> &'a Props {
        self.props
    }

    pub fn state(&self) -> &'a C::State {
        self.state
    }

    pub fn updater(&self) -> &'a Updater<C::State> {
        self.updater
    }

    pub fn set_state(&self, update: impl FnOnce(&C::State) -> C::State + 'static) {
        self.updater.set_state(update);
    }
}

type StateUpdate<S> = Box<dyn FnOnce(&S) -> S>;

/// Queues state changes for a class component. Queued updates are applied
/// in order on the next flush, each seeing the result of the previous one.
pub struct Updater<S> {
    pending: Rc<RefCell<Vec<StateUpdate<S>>>>,
    cell: Weak<ClassCell>,
    runtime: RuntimeHandle,
}

impl<S> Clone for Updater<S> {
    fn clone(&self) -> Self {
        Self {
            pending: Rc::clone(&self.pending),
            cell: Weak::clone(&self.cell),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S: 'static> Updater<S> {
    pub fn set_state(&self, update: impl FnOnce(&S) -> S + 'static) {
        let Some(cell) = self.cell.upgrade() else {
            return;
        };
        if cell.is_removed() {
            log::warn!("set_state on unmounted component {}", cell.name);
            return;
        }
        self.pending.borrow_mut().push(Box::new(update));
        self.runtime.schedule_class(&cell);
    }

    pub fn replace(&self, state: S) {
        self.set_state(move |_| state);
    }
}

/// Type-erased view of a constructed class component.
trait ClassInstance {
    fn render(&self) -> VNode;
    fn props(&self) -> Props;
    fn replace_props(&mut self, props: Props) -> Props;
    fn has_pending(&self) -> bool;
    fn commit_pending(&mut self) -> Option<Box<dyn Any>>;
    fn did_mount(&mut self);
    fn did_update(&mut self, prev_props: &Props, prev_state: Option<Box<dyn Any>>);
    fn will_unmount(&mut self);
}

struct ClassHost<C: Component> {
    component: C,
    props: Props,
    state: C::State,
    updater: Updater<C::State>,
}

impl<C: Component> ClassHost<C> {
    fn construct(props: Props, runtime: RuntimeHandle, cell: Weak<ClassCell>) -> Box<dyn ClassInstance> {
        let component = C::create(&props);
        let state = component.initial_state(&props);
        let updater = Updater {
            pending: Rc::new(RefCell::new(Vec::new())),
            cell,
            runtime,
        };
        Box::new(Self {
            component,
            props,
            state,
            updater,
        })
    }
}

impl<C: Component> ClassInstance for ClassHost<C> {
    fn render(&self) -> VNode {
        self.component.render(&ClassContext {
            props: &self.props,
            state: &self.state,
            updater: &self.updater,
        })
    }

    fn props(&self) -> Props {
        self.props.clone()
    }

    fn replace_props(&mut self, props: Props) -> Props {
        std::mem::replace(&mut self.props, props)
    }

    fn has_pending(&self) -> bool {
        !self.updater.pending.borrow().is_empty()
    }

    fn commit_pending(&mut self) -> Option<Box<dyn Any>> {
        let updates = std::mem::take(&mut *self.updater.pending.borrow_mut());
        if updates.is_empty() {
            return None;
        }
        let previous = self.state.clone();
        for update in updates {
            self.state = update(&self.state);
        }
        Some(Box::new(previous))
    }

    fn did_mount(&mut self) {
        let cx = ClassContext {
            props: &self.props,
            state: &self.state,
            updater: &self.updater,
        };
        self.component.did_mount(&cx);
    }

    fn did_update(&mut self, prev_props: &Props, prev_state: Option<Box<dyn Any>>) {
        let prev_state = prev_state
            .and_then(|state| state.downcast::<C::State>().ok())
            .map_or_else(|| self.state.clone(), |state| *state);
        let cx = ClassContext {
            props: &self.props,
            state: &self.state,
            updater: &self.updater,
        };
        self.component.did_update(&cx, prev_props, &prev_state);
    }

    fn will_unmount(&mut self) {
        let cx = ClassContext {
            props: &self.props,
            state: &self.state,
            updater: &self.updater,
        };
        self.component.will_unmount(&cx);
    }
}

type Construct = fn(Props, RuntimeHandle, Weak<ClassCell>) -> Box<dyn ClassInstance>;

/// Node type for a [`Component`], built with [`class`].
#[derive(Clone, Copy)]
pub struct ClassComponent {
    type_id: TypeId,
    name: &'static str,
    construct: Construct,
}

impl ClassComponent {
    pub fn of<C: Component>() -> Self {
        let full = std::any::type_name::<C>();
        Self {
            type_id: TypeId::of::<C>(),
            name: full.rsplit("::").next().unwrap_or(full),
            construct: ClassHost::<C>::construct,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn same_type(&self, other: &ClassComponent) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for ClassComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassComponent({})", self.name)
    }
}

/// Node type for the class component `C`.
pub fn class<C: Component>() -> ClassComponent {
    ClassComponent::of::<C>()
}

/// A constructed class component and its rendered output.
pub(crate) struct ClassCell {
    id: usize,
    name: &'static str,
    host: RefCell<Box<dyn ClassInstance>>,
    rendered: RefCell<Option<VNode>>,
    container: Cell<NodeId>,
    removed: Cell<bool>,
}

impl ClassCell {
    pub(crate) fn create(
        component: &ClassComponent,
        props: Props,
        runtime: RuntimeHandle,
        container: NodeId,
    ) -> Rc<Self> {
        Rc::new_cyclic(|cell| Self {
            id: next_instance_id(),
            name: component.name,
            host: RefCell::new((component.construct)(props, runtime, Weak::clone(cell))),
            rendered: RefCell::new(None),
            container: Cell::new(container),
            removed: Cell::new(false),
        })
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.get()
    }

    pub(crate) fn container(&self) -> NodeId {
        self.container.get()
    }

    pub(crate) fn set_container(&self, container: NodeId) {
        self.container.set(container);
    }

    pub(crate) fn render(&self) -> VNode {
        self.host.borrow().render()
    }

    pub(crate) fn props(&self) -> Props {
        self.host.borrow().props()
    }

    pub(crate) fn replace_props(&self, props: Props) -> Props {
        self.host.borrow_mut().replace_props(props)
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.host.borrow().has_pending()
    }

    pub(crate) fn commit_pending(&self) -> Option<Box<dyn Any>> {
        self.host.borrow_mut().commit_pending()
    }

    pub(crate) fn did_mount(&self) {
        self.host.borrow_mut().did_mount();
    }

    pub(crate) fn did_update(&self, prev_props: &Props, prev_state: Option<Box<dyn Any>>) {
        self.host.borrow_mut().did_update(prev_props, prev_state);
    }

    /// Runs `will_unmount` and rejects further state updates.
    pub(crate) fn will_unmount(&self) {
        self.host.borrow_mut().will_unmount();
        self.removed.set(true);
    }

    pub(crate) fn with_rendered<R>(&self, f: impl FnOnce(Option<&VNode>) -> R) -> R {
        f(self.rendered.borrow().as_ref())
    }

    pub(crate) fn take_rendered(&self) -> Option<VNode> {
        self.rendered.borrow_mut().take()
    }

    pub(crate) fn set_rendered(&self, rendered: Option<VNode>) {
        *self.rendered.borrow_mut() = rendered;
    }
}

#[cfg(test)]
#[path = "tests/class_tests.rs"]
mod tests;
