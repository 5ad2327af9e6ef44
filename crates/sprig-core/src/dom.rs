//! Live render targets.
//!
//! The reconciler only talks to a [`RenderTarget`]. [`MemoryDocument`] is the
//! in-memory target used by tests and headless hosts; it keeps a mutation log
//! in the shape of a DOM mutation observer watching the whole document.

use crate::collections::ordered::{self, OrderedMap};
use crate::collections::NodeList;
use crate::props::{Event, EventHandler, PropValue, StyleMap};
use crate::{NodeError, NodeId};
use std::any::Any;
use std::fmt::Write as _;

pub trait RenderTarget: Any {
    fn create_element(&mut self, tag: &str) -> NodeId;

    fn create_text(&mut self, text: &str) -> NodeId;

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), NodeError>;

    /// Inserts `child` into `parent` before `before` (or last). A child that
    /// is already attached somewhere is moved.
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), NodeError>;

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError>;

    /// Releases a detached node and its descendants.
    fn dispose(&mut self, node: NodeId);

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), NodeError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), NodeError>;

    fn set_property(&mut self, node: NodeId, name: &str, value: &PropValue)
        -> Result<(), NodeError>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), NodeError>;

    fn remove_style(&mut self, node: NodeId, property: &str) -> Result<(), NodeError>;

    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), NodeError>;

    fn remove_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), NodeError>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Result<&[NodeId], NodeError>;

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent)
            .ok()
            .and_then(|children| children.get(index).copied())
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let children = self.children(parent).ok()?;
        let index = children.iter().position(|&child| child == node)?;
        children.get(index + 1).copied()
    }
}

/// One entry of the mutation log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList {
        target: NodeId,
        added: NodeList,
        removed: NodeList,
    },
    Attribute {
        target: NodeId,
        name: String,
    },
    CharacterData {
        target: NodeId,
    },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            MutationRecord::ChildList { target, .. }
            | MutationRecord::Attribute { target, .. }
            | MutationRecord::CharacterData { target } => *target,
        }
    }
}

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: OrderedMap<String, String>,
    properties: OrderedMap<String, PropValue>,
    style: StyleMap,
    listeners: Vec<(String, EventHandler)>,
}

enum NodeData {
    Element(ElementData),
    Text(String),
}

struct LiveNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document. Slots are never reused, so a stale id keeps
/// reporting `NodeError::Missing` instead of aliasing a new node.
pub struct MemoryDocument {
    nodes: Vec<Option<LiveNode>>,
    root: NodeId,
    mutations: Vec<MutationRecord>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Creates a document with a `body` root.
    pub fn new() -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            root: 0,
            mutations: Vec::new(),
        };
        document.root = document.create_element("body");
        document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates an element and appends it to the root, for use as a render
    /// container.
    pub fn create_container(&mut self, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        let root = self.root;
        // root and a freshly created node always exist
        let _ = self.insert_before(root, node, None);
        node
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(LiveNode {
            data,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn node(&self, id: NodeId) -> Result<&LiveNode, NodeError> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(NodeError::Missing { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut LiveNode, NodeError> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(NodeError::Missing { id })
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, NodeError> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(NodeError::NotAnElement { id }),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, NodeError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(NodeError::NotAnElement { id }),
        }
    }

    /// Whether `id` is attached (transitively) to the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    fn record(&mut self, record: MutationRecord) {
        if self.is_connected(record.target()) {
            self.mutations.push(record);
        }
    }

    pub fn mutations(&self) -> &[MutationRecord] {
        &self.mutations
    }

    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    pub fn clear_mutations(&mut self) {
        self.mutations.clear();
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|element| element.tag.as_str())
    }

    /// Text of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).ok()?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    /// Concatenated text of `id` and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .ok()
            .and_then(|element| element.attributes.get(name))
            .map(String::as_str)
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&PropValue> {
        self.element(id)
            .ok()
            .and_then(|element| element.properties.get(name))
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)
            .ok()
            .and_then(|element| element.style.get(property))
            .map(String::as_str)
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        self.element(id)
            .map(|element| element.listeners.len())
            .unwrap_or(0)
    }

    /// Elements with `tag` under `root`, in document order.
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(root, &mut |id, doc| {
            if doc.tag(id) == Some(tag) {
                found.push(id);
            }
        });
        found
    }

    /// Every element under `root` (inclusive), in document order.
    pub fn elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(root, &mut |id, doc| {
            if doc.tag(id).is_some() {
                found.push(id);
            }
        });
        found
    }

    pub fn find_by_attribute(&self, root: NodeId, name: &str, value: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(root, &mut |id, doc| {
            if doc.attribute(id, name) == Some(value) {
                found.push(id);
            }
        });
        found
    }

    fn walk(&self, id: NodeId, visit: &mut dyn FnMut(NodeId, &Self)) {
        visit(id, self);
        if let Ok(node) = self.node(id) {
            for &child in &node.children {
                self.walk(child, visit);
            }
        }
    }

    /// Invokes the listeners registered for `event` on `target`, then on each
    /// ancestor. Handlers are collected first, so they may mutate state that
    /// eventually mutates this document. Returns the number of handlers run.
    pub fn dispatch_event(&self, target: NodeId, event: Event) -> usize {
        let mut event = event;
        event.retarget(target);
        let mut handlers = Vec::new();
        let mut current = Some(target);
        while let Some(id) = current {
            if let Ok(element) = self.element(id) {
                handlers.extend(
                    element
                        .listeners
                        .iter()
                        .filter(|(name, _)| name == event.name())
                        .map(|(_, handler)| handler.clone()),
                );
            }
            current = self.parent(id);
        }
        for handler in &handlers {
            handler.call(&event);
        }
        handlers.len()
    }

    /// Indented outline of the subtree at `id`.
    pub fn dump_tree(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.dump_node(id, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let Ok(node) = self.node(id) else {
            let _ = writeln!(out, "{indent}<missing #{id}>");
            return;
        };
        match &node.data {
            NodeData::Text(text) => {
                let _ = writeln!(out, "{indent}#{id} {text:?}");
            }
            NodeData::Element(element) => {
                let _ = write!(out, "{indent}#{id} <{}", element.tag);
                for (name, value) in &element.attributes {
                    let _ = write!(out, " {name}={value:?}");
                }
                let _ = writeln!(out, ">");
                for &child in &node.children {
                    self.dump_node(child, depth + 1, out);
                }
            }
        }
    }

    fn detach(&mut self, child: NodeId) -> Result<(), NodeError> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        let siblings = &mut self.node_mut(parent)?.children;
        if let Some(index) = siblings.iter().position(|&id| id == child) {
            siblings.remove(index);
        }
        self.record(MutationRecord::ChildList {
            target: parent,
            added: NodeList::new(),
            removed: NodeList::from_slice(&[child]),
        });
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    fn style_text(style: &StyleMap) -> String {
        style
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn sync_style_attribute(&mut self, node: NodeId) -> Result<(), NodeError> {
        let element = self.element_mut(node)?;
        if element.style.is_empty() {
            element.attributes.shift_remove("style");
        } else {
            let text = Self::style_text(&element.style);
            element.attributes.insert("style".to_string(), text);
        }
        self.record(MutationRecord::Attribute {
            target: node,
            name: "style".to_string(),
        });
        Ok(())
    }
}

impl RenderTarget for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_string(),
            attributes: ordered::new(),
            properties: ordered::new(),
            style: ordered::new(),
            listeners: Vec::new(),
        }))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), NodeError> {
        match &mut self.node_mut(node)?.data {
            NodeData::Text(current) => {
                *current = text.to_string();
            }
            NodeData::Element(_) => return Err(NodeError::NotAnElement { id: node }),
        }
        self.record(MutationRecord::CharacterData { target: node });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), NodeError> {
        self.element(parent)?;
        self.node(child)?;
        if let Some(anchor) = before {
            if self.node(anchor)?.parent != Some(parent) {
                return Err(NodeError::NotAChild {
                    parent,
                    child: anchor,
                });
            }
        }
        self.detach(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = before
            .and_then(|anchor| siblings.iter().position(|&id| id == anchor))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.record(MutationRecord::ChildList {
            target: parent,
            added: NodeList::from_slice(&[child]),
            removed: NodeList::new(),
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError> {
        if self.node(child)?.parent != Some(parent) {
            return Err(NodeError::NotAChild { parent, child });
        }
        self.detach(child)
    }

    fn dispose(&mut self, node: NodeId) {
        let Some(Some(live)) = self.nodes.get_mut(node).map(Option::take) else {
            return;
        };
        for child in live.children {
            self.dispose(child);
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), NodeError> {
        let element = self.element_mut(node)?;
        if element.attributes.get(name).map(String::as_str) == Some(value) {
            return Ok(());
        }
        element.attributes.insert(name.to_string(), value.to_string());
        self.record(MutationRecord::Attribute {
            target: node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), NodeError> {
        if self.element_mut(node)?.attributes.shift_remove(name).is_some() {
            self.record(MutationRecord::Attribute {
                target: node,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn set_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), NodeError> {
        self.element_mut(node)?
            .properties
            .insert(name.to_string(), value.clone());
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), NodeError> {
        let element = self.element_mut(node)?;
        if element.style.get(property).map(String::as_str) == Some(value) {
            return Ok(());
        }
        element.style.insert(property.to_string(), value.to_string());
        self.sync_style_attribute(node)
    }

    fn remove_style(&mut self, node: NodeId, property: &str) -> Result<(), NodeError> {
        if self.element_mut(node)?.style.shift_remove(property).is_some() {
            self.sync_style_attribute(node)?;
        }
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), NodeError> {
        self.element_mut(node)?
            .listeners
            .push((event.to_string(), handler));
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), NodeError> {
        let listeners = &mut self.element_mut(node)?.listeners;
        if let Some(index) = listeners
            .iter()
            .position(|(name, existing)| name == event && existing.ptr_eq(handler))
        {
            listeners.remove(index);
        }
        Ok(())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok().and_then(|live| live.parent)
    }

    fn children(&self, node: NodeId) -> Result<&[NodeId], NodeError> {
        Ok(&self.node(node)?.children)
    }
}

#[cfg(test)]
#[path = "tests/dom_tests.rs"]
mod tests;
