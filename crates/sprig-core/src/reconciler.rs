//! Diffs successive virtual trees against a live [`RenderTarget`].

use crate::class::{ClassCell, ClassComponent};
use crate::collections::map::{HashMap, HashSet};
use crate::dom::RenderTarget;
use crate::hooks;
use crate::mutable_ref::NodeRef;
use crate::props::{attribute_name, is_property, listener_event, Key, PropValue, Props, StyleMap};
use crate::registry::{ComponentInstance, IdentityKey, InstanceUpdate};
use crate::render_context::{self, RenderFrame};
use crate::runtime::{RenderTask, Runtime};
use crate::vnode::{FunctionComponent, Mounted, VNode, VNodeKind};
use crate::{NodeId, RenderError};
use std::mem;
use std::rc::{Rc, Weak};

/// Counters accumulated by a [`Renderer`] over its lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub mounts: usize,
    pub unmounts: usize,
    pub moves: usize,
    /// Render function invocations, for function and class components.
    pub component_renders: usize,
    /// Re-renders performed by flushes.
    pub rerenders: usize,
    pub effects_run: usize,
    pub cleanups_run: usize,
    pub teardowns: usize,
    /// Components remounted because their instance had gone missing.
    pub remounts: usize,
}

/// Work done by one [`Renderer::flush`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub passes: usize,
    pub rerenders: usize,
    pub cleanups: usize,
    pub effects: usize,
    pub teardowns: usize,
}

impl FlushReport {
    pub fn is_idle(&self) -> bool {
        self.passes == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ChildKey {
    Keyed(Key),
    Position(usize),
}

impl ChildKey {
    fn of(node: &VNode, position: usize) -> Self {
        match &node.key {
            Some(key) => ChildKey::Keyed(key.clone()),
            None => ChildKey::Position(position),
        }
    }
}

/// Mounts virtual trees into containers of a render target and keeps them in
/// sync with later renders and state changes.
pub struct Renderer<T: RenderTarget> {
    runtime: Runtime,
    target: T,
    roots: HashMap<NodeId, VNode>,
    stats: RenderStats,
    /// First error met by the current render or flush after the target was
    /// already being changed.
    failure: Option<RenderError>,
}

impl<T: RenderTarget> Renderer<T> {
    pub fn new(runtime: Runtime, target: T) -> Self {
        Self {
            runtime,
            target,
            roots: HashMap::default(),
            stats: RenderStats::default(),
            failure: None,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RenderStats::default();
    }

    /// Tree most recently rendered into `container`.
    pub fn rendered(&self, container: NodeId) -> Option<&VNode> {
        self.roots.get(&container)
    }

    /// Live node currently standing for `vnode`, resolving components to the
    /// root of their output.
    pub fn live_node(&self, vnode: &VNode) -> Option<NodeId> {
        match &vnode.mounted {
            Some(Mounted::Function { output, .. }) => {
                output.borrow().as_ref().and_then(|node| self.live_node(node))
            }
            Some(Mounted::Class(cell)) => {
                cell.with_rendered(|rendered| rendered.and_then(|node| self.live_node(node)))
            }
            None => vnode.live,
        }
    }

    /// Renders `vnode` into `container`, diffing against whatever was
    /// rendered there before. A tree rejected up front leaves the container
    /// untouched.
    pub fn render(&mut self, vnode: VNode, container: NodeId) -> Result<(), RenderError> {
        self.validate(&vnode)?;
        self.failure = None;
        let previous = self.roots.remove(&container);
        log::debug!(
            "render <{}> into #{container} ({})",
            vnode.kind.name(),
            if previous.is_some() { "update" } else { "mount" }
        );
        if let Some(mounted) = self.reconcile(container, previous, Some(vnode))? {
            self.roots.insert(container, mounted);
        }
        self.take_failure()
    }

    /// Tears down the tree rendered into `container`. Returns `false` if
    /// nothing was rendered there.
    pub fn unmount(&mut self, container: NodeId) -> Result<bool, RenderError> {
        match self.roots.remove(&container) {
            Some(previous) => {
                self.unmount_node(previous)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drains the deferred-work queue: re-renders, then effect cleanups, then
    /// effects, then instance teardowns, repeated until nothing is left.
    pub fn flush(&mut self) -> Result<FlushReport, RenderError> {
        let limit = self.runtime.config().max_flush_passes;
        let mut report = FlushReport::default();
        self.failure = None;
        self.runtime.begin_flush_pass();
        while self.runtime.has_pending_work() {
            if report.passes == limit {
                self.fail(RenderError::FlushLimit { passes: limit });
                return self.take_failure().map(|()| report);
            }
            report.passes += 1;
            self.runtime.begin_flush_pass();

            for task in self.runtime.take_render_queue() {
                let performed = match task {
                    RenderTask::Function(instance) => match instance.upgrade() {
                        Some(instance) => self.rerender_function(&instance)?,
                        None => false,
                    },
                    RenderTask::Class(cell) => match cell.upgrade() {
                        Some(cell) => self.rerender_class(&cell)?,
                        None => false,
                    },
                };
                if performed {
                    report.rerenders += 1;
                }
            }

            let effects = self.runtime.take_effects();
            for effect in &effects {
                if effect.run_cleanup() {
                    report.cleanups += 1;
                }
            }
            for effect in effects {
                if effect.run() {
                    report.effects += 1;
                }
            }

            let (teardowns, cleanups) = self.runtime.run_teardowns();
            report.teardowns += teardowns;
            report.cleanups += cleanups;

            log::debug!(
                "flush pass {}: {} re-render(s), {} effect(s), {} cleanup(s), {} teardown(s)",
                report.passes,
                report.rerenders,
                report.effects,
                report.cleanups,
                report.teardowns
            );
        }
        self.stats.rerenders += report.rerenders;
        self.stats.effects_run += report.effects;
        self.stats.cleanups_run += report.cleanups;
        self.stats.teardowns += report.teardowns;
        self.take_failure().map(|()| report)
    }

    fn fail(&mut self, err: RenderError) {
        log::warn!("{err}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
    }

    fn take_failure(&mut self) -> Result<(), RenderError> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn validate(&self, vnode: &VNode) -> Result<(), RenderError> {
        if self.runtime.config().require_component_keys {
            check_component_keys(vnode)?;
        }
        Ok(())
    }

    /// Component output that fails validation is not applied. The error is
    /// returned once the current render or flush completes.
    fn accept(&mut self, rendered: VNode) -> Option<VNode> {
        match self.validate(&rendered) {
            Ok(()) => Some(rendered),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn reconcile(
        &mut self,
        parent: NodeId,
        old: Option<VNode>,
        new: Option<VNode>,
    ) -> Result<Option<VNode>, RenderError> {
        match (old, new) {
            (None, None) => Ok(None),
            (None, Some(new)) => self.mount(parent, new, None).map(Some),
            (Some(old), None) => {
                self.unmount_node(old)?;
                Ok(None)
            }
            (Some(old), Some(new)) => self.patch(parent, old, new).map(Some),
        }
    }

    fn mount(
        &mut self,
        parent: NodeId,
        mut vnode: VNode,
        before: Option<NodeId>,
    ) -> Result<VNode, RenderError> {
        match &vnode.kind {
            VNodeKind::Text(text) => {
                let live = self.target.create_text(text);
                self.target.insert_before(parent, live, before)?;
                vnode.live = Some(live);
            }
            VNodeKind::Element(tag) => {
                let live = self.target.create_element(tag);
                self.apply_props(live, None, &vnode.props)?;
                let children = mem::take(&mut vnode.props.children);
                let mut mounted = Vec::with_capacity(children.len());
                for child in children {
                    mounted.push(self.mount(live, child, None)?);
                }
                vnode.props.children = mounted;
                self.target.insert_before(parent, live, before)?;
                if let Some(node_ref) = &vnode.node_ref {
                    node_ref.set(Some(live));
                }
                vnode.live = Some(live);
            }
            VNodeKind::Function(component) => {
                let component = *component;
                return self.mount_function(parent, vnode, component, before);
            }
            VNodeKind::Class(component) => {
                let component = *component;
                return self.mount_class(parent, vnode, component, before);
            }
        }
        log::trace!("mounted <{}> as #{:?} under #{parent}", vnode.kind.name(), vnode.live);
        self.stats.mounts += 1;
        Ok(vnode)
    }

    fn mount_function(
        &mut self,
        parent: NodeId,
        mut vnode: VNode,
        component: FunctionComponent,
        before: Option<NodeId>,
    ) -> Result<VNode, RenderError> {
        let instance =
            self.runtime
                .create_instance(component, vnode.props.clone(), vnode.key.as_ref(), parent);
        let rendered = self.invoke(&instance);
        let rendered = self.accept(rendered).unwrap_or_else(VNode::empty);
        let mounted = self.mount(parent, rendered, before)?;
        vnode.live = self.live_node(&mounted);
        instance.set_rendered(Some(mounted));
        vnode.mounted = Some(Mounted::Function {
            identity: instance.identity().clone(),
            instance: Rc::downgrade(&instance),
            output: instance.output(),
        });
        self.stats.mounts += 1;
        Ok(vnode)
    }

    fn mount_class(
        &mut self,
        parent: NodeId,
        mut vnode: VNode,
        component: ClassComponent,
        before: Option<NodeId>,
    ) -> Result<VNode, RenderError> {
        let cell = ClassCell::create(&component, vnode.props.clone(), self.runtime.handle(), parent);
        let rendered = cell.render();
        self.stats.component_renders += 1;
        let rendered = self.accept(rendered).unwrap_or_else(VNode::empty);
        let mounted = self.mount(parent, rendered, before)?;
        vnode.live = self.live_node(&mounted);
        cell.set_rendered(Some(mounted));
        vnode.mounted = Some(Mounted::Class(Rc::clone(&cell)));
        cell.did_mount();
        self.stats.mounts += 1;
        Ok(vnode)
    }

    /// Runs the instance's render function inside a fresh render frame.
    fn invoke(&mut self, instance: &Rc<ComponentInstance>) -> VNode {
        self.runtime.cancel_render(instance.id());
        instance.begin_render();
        let guard = render_context::enter(RenderFrame::new(
            self.runtime.handle(),
            self.runtime.store(),
            Rc::clone(instance),
        ));
        let component = instance.component();
        let rendered = instance.with_props(|props| component.invoke(props));
        hooks::finish_render(guard.frame());
        drop(guard);
        self.stats.component_renders += 1;
        rendered
    }

    fn patch(&mut self, parent: NodeId, mut old: VNode, mut new: VNode) -> Result<VNode, RenderError> {
        if !old.kind.same_type(&new.kind) || old.key != new.key {
            return self.replace(parent, old, new);
        }
        match &new.kind {
            VNodeKind::Text(text) => {
                let Some(live) = old.live else {
                    return self.mount(parent, new, None);
                };
                if old.text_value() != Some(text.as_str()) {
                    self.target.set_text(live, text)?;
                }
                new.live = Some(live);
            }
            VNodeKind::Element(_) => {
                let Some(live) = old.live else {
                    return self.mount(parent, new, None);
                };
                self.apply_props(live, Some(&old.props), &new.props)?;
                patch_ref(live, old.node_ref.as_ref(), new.node_ref.as_ref());
                let old_children = mem::take(&mut old.props.children);
                let new_children = mem::take(&mut new.props.children);
                new.props.children = self.reconcile_children(live, old_children, new_children)?;
                new.live = Some(live);
            }
            VNodeKind::Function(_) => return self.update_function(parent, old, new),
            VNodeKind::Class(_) => return self.update_class(parent, old, new),
        }
        Ok(new)
    }

    /// Unmounts `old` and mounts `new` where `old` stood.
    fn replace(&mut self, parent: NodeId, old: VNode, new: VNode) -> Result<VNode, RenderError> {
        let previous = self.live_node(&old);
        let parent = previous
            .and_then(|live| self.target.parent(live))
            .unwrap_or(parent);
        let before = previous.and_then(|live| self.target.next_sibling(live));
        log::trace!("replacing <{}> with <{}>", old.kind.name(), new.kind.name());
        self.unmount_node(old)?;
        self.mount(parent, new, before)
    }

    /// Registry entry still owned by the mounted node, if it is live.
    fn resolve(&self, identity: &IdentityKey, instance: &Weak<ComponentInstance>) -> Option<Rc<ComponentInstance>> {
        let found = self.runtime.instance(identity)?;
        (Weak::as_ptr(instance) == Rc::as_ptr(&found) && !found.is_removed()).then_some(found)
    }

    fn update_function(&mut self, parent: NodeId, old: VNode, mut new: VNode) -> Result<VNode, RenderError> {
        let resolved = match &old.mounted {
            Some(Mounted::Function { identity, instance, .. }) => self
                .resolve(identity, instance)
                .map(|instance| (identity.clone(), instance)),
            _ => None,
        };
        let Some((identity, instance)) = resolved else {
            return self.recover_missing(parent, old, new);
        };
        self.runtime.registry().update_instance(
            &identity,
            InstanceUpdate::default()
                .props(new.props.clone())
                .container(parent),
        );
        let rendered = self.invoke(&instance);
        let previous = instance.take_rendered();
        let mounted = match self.accept(rendered) {
            Some(rendered) => self.reconcile(parent, previous, Some(rendered))?,
            None => previous,
        };
        new.live = mounted.as_ref().and_then(|node| self.live_node(node));
        instance.set_rendered(mounted);
        new.mounted = Some(Mounted::Function {
            identity,
            instance: Rc::downgrade(&instance),
            output: instance.output(),
        });
        Ok(new)
    }

    fn update_class(&mut self, parent: NodeId, mut old: VNode, mut new: VNode) -> Result<VNode, RenderError> {
        let cell = match old.mounted.take() {
            Some(Mounted::Class(cell)) if !cell.is_removed() => cell,
            other => {
                old.mounted = other;
                return self.recover_missing(parent, old, new);
            }
        };
        let prev_props = cell.replace_props(new.props.clone());
        let prev_state = cell.commit_pending();
        self.runtime.cancel_render(cell.id());
        cell.set_container(parent);
        let rendered = cell.render();
        self.stats.component_renders += 1;
        let previous = cell.take_rendered();
        let mounted = match self.accept(rendered) {
            Some(rendered) => self.reconcile(parent, previous, Some(rendered))?,
            None => previous,
        };
        new.live = mounted.as_ref().and_then(|node| self.live_node(node));
        cell.set_rendered(mounted);
        new.mounted = Some(Mounted::Class(Rc::clone(&cell)));
        cell.did_update(&prev_props, prev_state);
        Ok(new)
    }

    /// The mounted node lost its instance: warn, count, and remount. Strict
    /// mode keeps the old node in place and reports the error instead.
    fn recover_missing(&mut self, parent: NodeId, old: VNode, new: VNode) -> Result<VNode, RenderError> {
        let identity = match &old.mounted {
            Some(Mounted::Function { identity, .. }) => identity.to_string(),
            _ => old.kind.name().to_string(),
        };
        self.runtime.record_anomaly();
        if self.runtime.config().strict_instances {
            self.fail(RenderError::MissingInstance { identity });
            return Ok(old);
        }
        log::warn!("no live instance for {identity} during update, remounting");
        self.stats.remounts += 1;
        self.replace(parent, old, new)
    }

    fn rerender_function(&mut self, instance: &Rc<ComponentInstance>) -> Result<bool, RenderError> {
        if instance.is_removed() || !instance.needs_render() {
            return Ok(false);
        }
        let rendered = self.invoke(instance);
        if let Some(rendered) = self.accept(rendered) {
            let previous = instance.take_rendered();
            let mounted = self.reconcile(instance.container(), previous, Some(rendered))?;
            instance.set_rendered(mounted);
        }
        Ok(true)
    }

    fn rerender_class(&mut self, cell: &Rc<ClassCell>) -> Result<bool, RenderError> {
        if cell.is_removed() || !cell.has_pending() {
            return Ok(false);
        }
        let prev_props = cell.props();
        let prev_state = cell.commit_pending();
        let rendered = cell.render();
        self.stats.component_renders += 1;
        if let Some(rendered) = self.accept(rendered) {
            let previous = cell.take_rendered();
            let mounted = self.reconcile(cell.container(), previous, Some(rendered))?;
            cell.set_rendered(mounted);
        }
        log::trace!("re-rendered {}", cell.name());
        cell.did_update(&prev_props, prev_state);
        Ok(true)
    }

    fn unmount_node(&mut self, mut vnode: VNode) -> Result<(), RenderError> {
        match vnode.mounted.take() {
            Some(Mounted::Function { instance, output, .. }) => {
                // the output outlives an instance displaced from its key
                let rendered = output.borrow_mut().take();
                if let Some(rendered) = rendered {
                    self.unmount_node(rendered)?;
                }
                if let Some(instance) = instance.upgrade() {
                    self.runtime.retire(&instance);
                }
            }
            Some(Mounted::Class(cell)) => {
                cell.will_unmount();
                self.runtime.cancel_render(cell.id());
                if let Some(rendered) = cell.take_rendered() {
                    self.unmount_node(rendered)?;
                }
            }
            None => {
                let Some(live) = vnode.live else {
                    return Ok(());
                };
                if matches!(vnode.kind, VNodeKind::Element(_)) {
                    self.detach_props(live, &vnode.props)?;
                    for child in mem::take(&mut vnode.props.children) {
                        self.unmount_node(child)?;
                    }
                }
                self.detach(live)?;
                if let Some(node_ref) = &vnode.node_ref {
                    if node_ref.current() == Some(live) {
                        node_ref.set(None);
                    }
                }
            }
        }
        self.stats.unmounts += 1;
        Ok(())
    }

    fn detach(&mut self, live: NodeId) -> Result<(), RenderError> {
        if let Some(parent) = self.target.parent(live) {
            self.target.remove_child(parent, live)?;
        }
        self.target.dispose(live);
        log::trace!("unmounted #{live}");
        Ok(())
    }

    fn reconcile_children(
        &mut self,
        parent: NodeId,
        old: Vec<VNode>,
        new: Vec<VNode>,
    ) -> Result<Vec<VNode>, RenderError> {
        let mut old: Vec<Option<VNode>> = old.into_iter().map(Some).collect();
        let mut by_key: HashMap<ChildKey, usize> = HashMap::default();
        for (position, child) in old.iter().enumerate() {
            let Some(child) = child else { continue };
            let key = ChildKey::of(child, position);
            if by_key.contains_key(&key) {
                log::warn!("duplicate key {key:?} under #{parent}");
                continue;
            }
            by_key.insert(key, position);
        }

        let mut seen = HashSet::default();
        let mut matches = Vec::with_capacity(new.len());
        for (position, child) in new.iter().enumerate() {
            let key = ChildKey::of(child, position);
            if !seen.insert(key.clone()) {
                log::warn!("duplicate key {key:?} under #{parent}");
                matches.push(None);
                continue;
            }
            matches.push(by_key.remove(&key).and_then(|index| old[index].take()));
        }

        for leftover in old.into_iter().flatten() {
            self.unmount_node(leftover)?;
        }

        let mut result = Vec::with_capacity(new.len());
        for (position, (child, previous)) in new.into_iter().zip(matches).enumerate() {
            let mounted = match previous {
                Some(previous) => {
                    let patched = self.patch(parent, previous, child)?;
                    self.place(parent, &patched, position)?;
                    patched
                }
                None => {
                    let before = self.target.child_at(parent, position);
                    self.mount(parent, child, before)?
                }
            };
            result.push(mounted);
        }
        Ok(result)
    }

    /// Moves the live node of `vnode` to `position` under `parent` if it is
    /// elsewhere.
    fn place(&mut self, parent: NodeId, vnode: &VNode, position: usize) -> Result<(), RenderError> {
        let Some(live) = self.live_node(vnode) else {
            return Ok(());
        };
        let current = self.target.child_at(parent, position);
        if current != Some(live) {
            self.target.insert_before(parent, live, current)?;
            self.stats.moves += 1;
            log::trace!("moved #{live} to position {position} under #{parent}");
        }
        Ok(())
    }

    fn apply_props(&mut self, node: NodeId, old: Option<&Props>, new: &Props) -> Result<(), RenderError> {
        if let Some(old) = old {
            for (name, value) in old.iter() {
                if !new.contains(name) {
                    self.remove_prop(node, name, value)?;
                }
            }
        }
        for (name, value) in new.iter() {
            let mut previous = old.and_then(|old| old.get(name));
            if previous == Some(value) {
                continue;
            }
            if let Some(stale) = previous {
                if mem::discriminant(stale) != mem::discriminant(value) {
                    self.remove_prop(node, name, stale)?;
                    previous = None;
                }
            }
            self.set_prop(node, name, previous, value)?;
        }
        Ok(())
    }

    fn set_prop(
        &mut self,
        node: NodeId,
        name: &str,
        previous: Option<&PropValue>,
        value: &PropValue,
    ) -> Result<(), RenderError> {
        match value {
            PropValue::Handler(handler) => {
                let Some(event) = listener_event(name) else {
                    log::warn!("handler stored under {name:?} is not an on* prop, skipping");
                    return Ok(());
                };
                if let Some(PropValue::Handler(stale)) = previous {
                    self.target.remove_listener(node, &event, stale)?;
                }
                self.target.add_listener(node, &event, handler.clone())?;
            }
            PropValue::Style(style) => {
                let empty = StyleMap::default();
                let stale = match previous {
                    Some(PropValue::Style(stale)) => stale,
                    _ => &empty,
                };
                for property in stale.keys() {
                    if !style.contains_key(property) {
                        self.target.remove_style(node, property)?;
                    }
                }
                for (property, text) in style {
                    if stale.get(property) != Some(text) {
                        self.target.set_style(node, property, text)?;
                    }
                }
            }
            PropValue::Data(_) | PropValue::Key(_) | PropValue::Ref(_) => {}
            _ if is_property(name) => self.target.set_property(node, name, value)?,
            _ => match value.to_attribute() {
                Some(text) => self.target.set_attribute(node, attribute_name(name), &text)?,
                None => self.target.remove_attribute(node, attribute_name(name))?,
            },
        }
        Ok(())
    }

    fn remove_prop(&mut self, node: NodeId, name: &str, value: &PropValue) -> Result<(), RenderError> {
        match value {
            PropValue::Handler(handler) => {
                if let Some(event) = listener_event(name) {
                    self.target.remove_listener(node, &event, handler)?;
                }
            }
            PropValue::Style(style) => {
                for property in style.keys() {
                    self.target.remove_style(node, property)?;
                }
            }
            PropValue::Data(_) | PropValue::Key(_) | PropValue::Ref(_) => {}
            _ if is_property(name) => {
                let reset = if name == "value" {
                    PropValue::from("")
                } else {
                    PropValue::Bool(false)
                };
                self.target.set_property(node, name, &reset)?;
            }
            _ => self.target.remove_attribute(node, attribute_name(name))?,
        }
        Ok(())
    }

    /// Detaches listeners and styles ahead of removing an element.
    fn detach_props(&mut self, node: NodeId, props: &Props) -> Result<(), RenderError> {
        for (name, value) in props.iter() {
            if matches!(value, PropValue::Handler(_) | PropValue::Style(_)) {
                self.remove_prop(node, name, value)?;
            }
        }
        Ok(())
    }
}

fn patch_ref(live: NodeId, old: Option<&NodeRef>, new: Option<&NodeRef>) {
    if let (Some(old), Some(new)) = (old, new) {
        if old.ptr_eq(new) {
            return;
        }
    }
    if let Some(old) = old {
        if old.current() == Some(live) {
            old.set(None);
        }
    }
    if let Some(new) = new {
        new.set(Some(live));
    }
}

fn check_unkeyed_siblings(children: &[VNode]) -> Result<(), RenderError> {
    let mut seen = HashSet::default();
    for child in children {
        if let VNodeKind::Function(component) = &child.kind {
            if child.key.is_none() && !seen.insert(component.name()) {
                return Err(RenderError::UnkeyedSiblings {
                    component: component.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Checks every element child list of `vnode`, stopping at components,
/// whose output is checked when they render.
fn check_component_keys(vnode: &VNode) -> Result<(), RenderError> {
    if matches!(vnode.kind, VNodeKind::Element(_)) {
        check_unkeyed_siblings(vnode.children())?;
        for child in vnode.children() {
            check_component_keys(child)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/reconciler_tests.rs"]
mod tests;
