//! Attribute, event and data values carried by virtual nodes.
//!
//! A [`Config`] is what application code hands to
//! [`create_element`](crate::create_element); the builder pulls `key` and
//! `ref` out of it and keeps the rest as the node's [`Props`].

use crate::collections::ordered::{self, OrderedMap};
use crate::mutable_ref::NodeRef;
use crate::vnode::VNode;
use crate::NodeId;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Property names that are written to the live node as properties rather than
/// attributes.
pub(crate) const PROPERTY_NAMES: &[&str] = &["checked", "value", "selected"];

/// Stable identity hint for a node among its siblings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Str(Rc<str>),
    Int(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(value) => f.write_str(value),
            Key::Int(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

/// Event delivered to listeners by a render target.
#[derive(Clone, Debug)]
pub struct Event {
    name: String,
    target: Option<NodeId>,
    value: Option<String>,
    checked: Option<bool>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            value: None,
            checked: None,
        }
    }

    /// Carries an input value, as an `input` or `change` event would.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node the event was dispatched on. Set by the render target.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn checked(&self) -> Option<bool> {
        self.checked
    }

    pub(crate) fn retarget(&mut self, target: NodeId) {
        self.target = Some(target);
    }
}

/// Shared event callback. Two handlers are equal only when they are the same
/// allocation, so a closure rebuilt on every render counts as a change.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

pub type StyleMap = OrderedMap<String, String>;

/// One entry of a node's attribute/event map.
#[derive(Clone)]
pub enum PropValue {
    Str(Rc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(EventHandler),
    Style(StyleMap),
    /// Opaque application data, only meaningful to components.
    Data(Rc<dyn Any>),
    Key(Key),
    Ref(NodeRef),
}

impl PropValue {
    /// Attribute text for this value. `None` means the attribute should be
    /// absent (`false`, handlers, data).
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            PropValue::Str(value) => Some(value.to_string()),
            PropValue::Int(value) => Some(value.to_string()),
            PropValue::Float(value) => Some(value.to_string()),
            PropValue::Bool(true) => Some(String::new()),
            PropValue::Key(key) => Some(key.to_string()),
            PropValue::Bool(false)
            | PropValue::Handler(_)
            | PropValue::Style(_)
            | PropValue::Data(_)
            | PropValue::Ref(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            PropValue::Str(_) => "str",
            PropValue::Int(_) => "int",
            PropValue::Float(_) => "float",
            PropValue::Bool(_) => "bool",
            PropValue::Handler(_) => "handler",
            PropValue::Style(_) => "style",
            PropValue::Data(_) => "data",
            PropValue::Key(_) => "key",
            PropValue::Ref(_) => "ref",
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.ptr_eq(b),
            (PropValue::Style(a), PropValue::Style(b)) => a == b,
            (PropValue::Data(a), PropValue::Data(b)) => Rc::ptr_eq(a, b),
            (PropValue::Key(a), PropValue::Key(b)) => a == b,
            (PropValue::Ref(a), PropValue::Ref(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(value) => write!(f, "{value:?}"),
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Handler(handler) => write!(f, "{handler:?}"),
            PropValue::Style(style) => write!(f, "{style:?}"),
            PropValue::Key(key) => write!(f, "Key({key})"),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

impl From<StyleMap> for PropValue {
    fn from(value: StyleMap) -> Self {
        PropValue::Style(value)
    }
}

/// Maps `onClick` style prop names to the listener event name (`click`).
pub(crate) fn listener_event(name: &str) -> Option<String> {
    let rest = name.strip_prefix("on")?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_ascii_lowercase())
}

pub(crate) fn is_property(name: &str) -> bool {
    PROPERTY_NAMES.contains(&name)
}

pub(crate) fn attribute_name(name: &str) -> &str {
    match name {
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    }
}

/// Builder input for [`create_element`](crate::create_element).
#[derive(Clone, Default)]
pub struct Config {
    entries: OrderedMap<String, PropValue>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            entries: ordered::new(),
        }
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    pub fn attr(self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(name, value)
    }

    pub fn class_name(self, value: impl Into<PropValue>) -> Self {
        self.set("className", value)
    }

    /// Registers a listener for `event` (`"click"` is stored as `onClick`).
    pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.on_handler(event, EventHandler::new(handler))
    }

    pub fn on_handler(self, event: &str, handler: EventHandler) -> Self {
        let mut chars = event.chars();
        let name = match chars.next() {
            Some(first) => format!("on{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => "on".to_string(),
        };
        self.set(name, PropValue::Handler(handler))
    }

    /// Adds one property to the decomposed `style` map.
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        match self.entries.get_mut("style") {
            Some(PropValue::Style(style)) => {
                style.insert(property.into(), value.into());
            }
            _ => {
                let mut style = ordered::new();
                style.insert(property.into(), value.into());
                self.entries.insert("style".to_string(), PropValue::Style(style));
            }
        }
        self
    }

    pub fn data<T: 'static>(self, name: impl Into<String>, value: T) -> Self {
        self.set(name, PropValue::Data(Rc::new(value)))
    }

    pub fn key(self, key: impl Into<Key>) -> Self {
        self.set("key", PropValue::Key(key.into()))
    }

    pub fn node_ref(self, node_ref: &NodeRef) -> Self {
        self.set("ref", PropValue::Ref(node_ref.clone()))
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    /// Splits out `key` and `ref`, leaving the attribute/event map.
    pub(crate) fn into_parts(mut self) -> (Option<Key>, Option<NodeRef>, OrderedMap<String, PropValue>) {
        let key = match self.entries.shift_remove("key") {
            Some(PropValue::Key(key)) => Some(key),
            Some(PropValue::Str(value)) => Some(Key::Str(value)),
            Some(PropValue::Int(value)) => Some(Key::Int(value)),
            Some(other) => {
                log::warn!("ignoring key of unsupported kind {}", other.kind());
                None
            }
            None => None,
        };
        let node_ref = match self.entries.shift_remove("ref") {
            Some(PropValue::Ref(node_ref)) => Some(node_ref),
            Some(other) => {
                log::warn!("ignoring ref of unsupported kind {}", other.kind());
                None
            }
            None => None,
        };
        (key, node_ref, self.entries)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Configuration seen by the reconciler and by components: the attribute and
/// event map plus the node's children.
#[derive(Clone, Default)]
pub struct Props {
    values: OrderedMap<String, PropValue>,
    pub(crate) children: Vec<VNode>,
}

impl Props {
    pub(crate) fn from_parts(values: OrderedMap<String, PropValue>, children: Vec<VNode>) -> Self {
        Self { values, children }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropValue::as_int)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropValue::as_bool)
    }

    /// Handler stored under `name` (`"onClick"`).
    pub fn handler(&self, name: &str) -> Option<&EventHandler> {
        self.get(name).and_then(PropValue::as_handler)
    }

    pub fn data<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        match self.get(name) {
            Some(PropValue::Data(data)) => Rc::clone(data).downcast::<T>().ok(),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        &self.children
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("values", &self.values)
            .field("children", &self.children.len())
            .finish()
    }
}
