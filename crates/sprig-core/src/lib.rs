#![doc = r"Core runtime for sprig: virtual trees, hooks and a keyed reconciler."]
#![allow(clippy::missing_const_for_thread_local)]

pub extern crate self as sprig_core;

pub mod class;
pub mod collections;
pub mod config;
pub mod dom;
pub mod hooks;
pub mod mutable_ref;
pub mod platform;
pub mod props;
pub mod reconciler;
pub mod registry;
mod render_context;
pub mod runtime;
pub mod store;
pub mod vnode;

pub use class::{class, ClassComponent, ClassContext, Component, Updater};
pub use config::RuntimeConfig;
pub use dom::{MemoryDocument, MutationRecord, RenderTarget};
pub use hooks::{
    use_effect, use_effect_with, use_memo, use_ref, use_shared_state, use_state, EffectCleanup,
    SharedSetter, StateSetter,
};
pub use mutable_ref::{MutableRef, NodeRef};
pub use platform::{FlushScheduler, ManualFlush};
pub use props::{Config, Event, EventHandler, Key, PropValue, Props, StyleMap};
pub use reconciler::{FlushReport, RenderStats, Renderer};
pub use registry::{ComponentInstance, IdentityKey, InstanceUpdate, Registry};
pub use render_context::is_rendering;
pub use runtime::{Runtime, RuntimeHandle};
pub use store::{SharedStore, Subscription};
pub use vnode::{create_element, Child, FunctionComponent, NodeType, VNode, VNodeKind};

pub type NodeId = usize;

/// Failure reported by a [`RenderTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    Missing { id: NodeId },
    NotAnElement { id: NodeId },
    NotAChild { parent: NodeId, child: NodeId },
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeError::Missing { id } => write!(f, "node {id} missing"),
            NodeError::NotAnElement { id } => write!(f, "node {id} is not an element"),
            NodeError::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of {parent}")
            }
        }
    }
}

impl std::error::Error for NodeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    Node(NodeError),
    /// A mounted component's registry entry was gone on update and
    /// `strict_instances` is set.
    MissingInstance { identity: String },
    /// Two unkeyed siblings render the same function component and
    /// `require_component_keys` is set.
    UnkeyedSiblings { component: String },
    FlushLimit { passes: usize },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Node(err) => write!(f, "render target error: {err}"),
            RenderError::MissingInstance { identity } => {
                write!(f, "no instance registered for {identity}")
            }
            RenderError::UnkeyedSiblings { component } => {
                write!(f, "unkeyed sibling instances of {component}")
            }
            RenderError::FlushLimit { passes } => {
                write!(f, "flush did not settle after {passes} passes")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Node(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NodeError> for RenderError {
    fn from(err: NodeError) -> Self {
        RenderError::Node(err)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
