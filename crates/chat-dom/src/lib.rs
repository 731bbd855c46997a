//! In-process model of the hosting page's render tree.
//!
//! The real integration surface is a browser DOM plus MutationObserver;
//! this crate reproduces the slice of that contract the emote engine
//! relies on: an arena of element/text nodes, atomic subtree replacement,
//! per-observer mutation batches, and the page location used to detect
//! single-page navigation.
//!
//! Invariants:
//! - Node ids are never reused within one tree; a detached node's id stays
//!   valid but `is_attached` reports false.
//! - `replace_with` is a single atomic swap: no observer ever sees the
//!   old node and its replacement in the tree at the same time.
//! - Observation handles must be returned via `disconnect`; the tree
//!   counts live observers so leaks are detectable in tests.

mod node;
mod observe;
mod query;

pub use node::{NodeId, NodeKind};
pub use observe::{MutationBatch, ObserverHandle};

use node::NodeData;
use observe::ObserverState;
use std::collections::HashMap;

/// Render-tree error type.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Unknown node id: {0:?}")]
    UnknownNode(NodeId),

    #[error("Node is not an element: {0:?}")]
    NotAnElement(NodeId),

    #[error("Node has no parent: {0:?}")]
    NoParent(NodeId),

    #[error("Node is already attached: {0:?}")]
    AlreadyAttached(NodeId),
}

/// The live page model.
pub struct DomTree {
    pub(crate) nodes: Vec<NodeData>,
    root: NodeId,
    location: String,
    focused: Option<NodeId>,
    pub(crate) observers: HashMap<u32, ObserverState>,
    pub(crate) next_observer: u32,
}

impl DomTree {
    /// Create a tree holding a single empty `body` root.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            location: String::new(),
            focused: None,
            observers: HashMap::new(),
            next_observer: 0,
        };
        tree.root = tree.create_element("body");
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current page URL, as the host reports it.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Simulate single-page navigation. The render tree itself is not
    /// touched; the host replaces panels separately, usually later.
    pub fn set_location(&mut self, url: impl Into<String>) {
        self.location = url.into();
    }

    pub fn focus(&mut self, id: NodeId) {
        self.focused = Some(id);
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // ---- node construction ----

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push(NodeData::element(tag.into()))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::text(text.into()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    // ---- structure ----

    /// Append `child` to `parent`'s child list and notify observers.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.expect_element(parent)?;
        if self.data(child)?.parent.is_some() {
            return Err(DomError::AlreadyAttached(child));
        }
        self.data_mut(child)?.parent = Some(parent);
        self.data_mut(parent)?.children.push(child);
        self.notify_added(parent, &[child]);
        Ok(())
    }

    /// Detach `id` (and its subtree) from the tree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self.data(id)?.parent.ok_or(DomError::NoParent(id))?;
        self.data_mut(parent)?.children.retain(|c| *c != id);
        self.data_mut(id)?.parent = None;
        Ok(())
    }

    /// Replace `target` with `replacements` in a single atomic swap.
    ///
    /// The replacements take `target`'s position, in order. Observers see
    /// one batch containing exactly the replacement nodes.
    pub fn replace_with(
        &mut self,
        target: NodeId,
        replacements: Vec<NodeId>,
    ) -> Result<(), DomError> {
        let parent = self.data(target)?.parent.ok_or(DomError::NoParent(target))?;
        for r in &replacements {
            if self.data(*r)?.parent.is_some() {
                return Err(DomError::AlreadyAttached(*r));
            }
        }
        let children = &mut self.data_mut(parent)?.children;
        let index = children
            .iter()
            .position(|c| *c == target)
            .ok_or(DomError::NoParent(target))?;
        children.splice(index..index + 1, replacements.iter().copied());
        self.data_mut(target)?.parent = None;
        for r in &replacements {
            self.data_mut(*r)?.parent = Some(parent);
        }
        self.notify_added(parent, &replacements);
        Ok(())
    }

    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.nodes.get(cur.index()).and_then(|d| d.parent) {
                Some(parent) => cur = parent,
                None => return false,
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|d| d.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    // ---- content ----

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|d| &d.kind)
    }

    /// Element tag name; `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Text of a text node; `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element { .. } => None,
        }
    }

    /// Concatenated text of the node and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element { .. }) => {
                for child in self.children(id).to_vec() {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: impl Into<String>) {
        if let Some(NodeKind::Element { classes, .. }) = self.kind_mut(id) {
            classes.push(class.into());
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        match self.kind(id) {
            Some(NodeKind::Element { classes, .. }) => classes.iter().any(|c| c == class),
            _ => false,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(NodeKind::Element { attrs, .. }) = self.kind_mut(id) {
            let name = name.into();
            let value = value.into();
            if let Some(slot) = attrs.iter_mut().find(|(n, _)| *n == name) {
                slot.1 = value;
            } else {
                attrs.push((name, value));
            }
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.nodes.get_mut(id.index()).map(|d| &mut d.kind)
    }

    pub(crate) fn data(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(id.index()).ok_or(DomError::UnknownNode(id))
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DomError::UnknownNode(id))
    }

    fn expect_element(&self, id: NodeId) -> Result<(), DomError> {
        match self.data(id)?.kind {
            NodeKind::Element { .. } => Ok(()),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
