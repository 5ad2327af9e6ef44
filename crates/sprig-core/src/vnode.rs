//! Virtual node construction.

use crate::class::{ClassCell, ClassComponent};
use crate::mutable_ref::NodeRef;
use crate::props::{Config, Key, Props};
use crate::registry::{ComponentInstance, IdentityKey};
use crate::NodeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A rendering function with a stable name. The name prefixes the identity
/// key of every instance created for it.
#[derive(Clone, Copy)]
pub struct FunctionComponent {
    name: &'static str,
    render: fn(&Props) -> VNode,
}

impl FunctionComponent {
    pub const fn new(name: &'static str, render: fn(&Props) -> VNode) -> Self {
        Self { name, render }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, props: &Props) -> VNode {
        (self.render)(props)
    }
}

impl PartialEq for FunctionComponent {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.render as usize == other.render as usize
    }
}

impl fmt::Debug for FunctionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionComponent({})", self.name)
    }
}

/// The three node types an application can ask the builder for.
#[derive(Clone, Debug)]
pub enum NodeType {
    Tag(String),
    Function(FunctionComponent),
    Class(ClassComponent),
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        NodeType::Tag(tag.to_string())
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        NodeType::Tag(tag)
    }
}

impl From<FunctionComponent> for NodeType {
    fn from(component: FunctionComponent) -> Self {
        NodeType::Function(component)
    }
}

impl From<ClassComponent> for NodeType {
    fn from(component: ClassComponent) -> Self {
        NodeType::Class(component)
    }
}

#[derive(Clone, Debug)]
pub enum VNodeKind {
    Text(String),
    Element(String),
    Function(FunctionComponent),
    Class(ClassComponent),
}

impl VNodeKind {
    /// Whether an old node of this kind can be patched in place by `other`.
    pub fn same_type(&self, other: &VNodeKind) -> bool {
        match (self, other) {
            (VNodeKind::Text(_), VNodeKind::Text(_)) => true,
            (VNodeKind::Element(a), VNodeKind::Element(b)) => a == b,
            (VNodeKind::Function(a), VNodeKind::Function(b)) => a == b,
            (VNodeKind::Class(a), VNodeKind::Class(b)) => a.same_type(b),
            _ => false,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VNodeKind::Text(_) => "#text",
            VNodeKind::Element(tag) => tag,
            VNodeKind::Function(component) => component.name(),
            VNodeKind::Class(component) => component.name(),
        }
    }
}

/// Component bookkeeping attached to a mounted component node.
pub(crate) enum Mounted {
    Function {
        identity: IdentityKey,
        instance: Weak<ComponentInstance>,
        /// The instance's rendered output, shared with it.
        output: Rc<RefCell<Option<VNode>>>,
    },
    Class(Rc<ClassCell>),
}

/// Immutable description of one node. Once handed to a renderer it is
/// retained as the "old" tree for the next diff and carries its live node.
pub struct VNode {
    pub(crate) kind: VNodeKind,
    pub(crate) props: Props,
    pub(crate) key: Option<Key>,
    pub(crate) node_ref: Option<NodeRef>,
    pub(crate) live: Option<NodeId>,
    pub(crate) mounted: Option<Mounted>,
}

impl VNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(VNodeKind::Text(text.into()), Props::default())
    }

    /// Placeholder rendered for `None`, `()` and booleans.
    pub fn empty() -> Self {
        Self::text(String::new())
    }

    fn with_kind(kind: VNodeKind, props: Props) -> Self {
        Self {
            kind,
            props,
            key: None,
            node_ref: None,
            live: None,
            mounted: None,
        }
    }

    pub fn kind(&self) -> &VNodeKind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[VNode] {
        self.props.children()
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn node_ref(&self) -> Option<&NodeRef> {
        self.node_ref.as_ref()
    }

    /// Live node this VNode was mounted to. Component nodes report the root
    /// of their output as of their last reconcile.
    pub fn live(&self) -> Option<NodeId> {
        self.live
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            VNodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, VNodeKind::Function(_) | VNodeKind::Class(_))
    }
}

/// Cloning yields a fresh, unmounted description of the same node.
impl Clone for VNode {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            props: self.props.clone(),
            key: self.key.clone(),
            node_ref: self.node_ref.clone(),
            live: None,
            mounted: None,
        }
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            VNodeKind::Text(text) => write!(f, "{text:?}"),
            kind => {
                let mut debug = f.debug_struct(kind.name());
                if let Some(key) = &self.key {
                    debug.field("key", key);
                }
                for (name, value) in self.props.iter() {
                    debug.field(name, value);
                }
                if !self.props.children.is_empty() {
                    debug.field("children", &self.props.children);
                }
                debug.finish()
            }
        }
    }
}

/// Anything that can appear in a child list before normalization.
pub enum Child {
    Node(VNode),
    Text(String),
    Empty,
    List(Vec<Child>),
}

impl Child {
    fn flatten_into(self, out: &mut Vec<VNode>) {
        match self {
            Child::Node(node) => out.push(node),
            Child::Text(text) => out.push(VNode::text(text)),
            Child::Empty => out.push(VNode::empty()),
            Child::List(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
        }
    }
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

macro_rules! numeric_child {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Text(value.to_string())
                }
            }
        )*
    };
}

numeric_child!(i32, i64, u32, u64, usize, f32, f64);

impl From<bool> for Child {
    fn from(_: bool) -> Self {
        Child::Empty
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(children: Vec<T>) -> Self {
        Child::List(children.into_iter().map(Into::into).collect())
    }
}

/// Builds a virtual node. Nested child lists are flattened, text and numbers
/// become text nodes, `None` and booleans become empty text nodes. `key` and
/// `ref` are lifted out of `config`.
pub fn create_element<T, I>(ty: T, config: impl Into<Option<Config>>, children: I) -> VNode
where
    T: Into<NodeType>,
    I: IntoIterator,
    I::Item: Into<Child>,
{
    let mut flat = Vec::new();
    for child in children {
        child.into().flatten_into(&mut flat);
    }
    let (key, node_ref, values) = config.into().unwrap_or_default().into_parts();
    let kind = match ty.into() {
        NodeType::Tag(tag) => VNodeKind::Element(tag),
        NodeType::Function(component) => VNodeKind::Function(component),
        NodeType::Class(component) => VNodeKind::Class(component),
    };
    let mut node = VNode::with_kind(kind, Props::from_parts(values, flat));
    node.key = key;
    node.node_ref = node_ref;
    node
}

/// `element!(type, config, child, child, ...)` with heterogeneous children.
#[macro_export]
macro_rules! element {
    ($ty:expr $(,)?) => {
        $crate::create_element($ty, $crate::Config::new(), ::std::iter::empty::<$crate::Child>())
    };
    ($ty:expr, $config:expr $(,)?) => {
        $crate::create_element($ty, $config, ::std::iter::empty::<$crate::Child>())
    };
    ($ty:expr, $config:expr, $($child:expr),+ $(,)?) => {
        $crate::create_element($ty, $config, [$($crate::Child::from($child)),+])
    };
}
