//! Selector-style queries over a subtree.

use crate::{DomTree, NodeId, NodeKind};

impl DomTree {
    /// Preorder walk of `root` and everything below it.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// First element below `root` (root included) carrying `class`.
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.has_class(*id, class))
    }

    /// First element below `root` with the given tag name.
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.tag(*id) == Some(tag))
    }

    /// First element matching both tag name and class.
    pub fn find_by_tag_class(&self, root: NodeId, tag: &str, class: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.tag(*id) == Some(tag) && self.has_class(*id, class))
    }

    /// First element with the given attribute value.
    pub fn find_by_attr(&self, root: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.attr(*id, name) == Some(value))
    }

    /// All elements below `root` carrying `class`, in document order.
    pub fn find_all_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_by_class(root, class, &mut out);
        out
    }

    fn collect_by_class(&self, id: NodeId, class: &str, out: &mut Vec<NodeId>) {
        if self.has_class(id, class) {
            out.push(id);
        }
        if let Some(NodeKind::Element { .. }) = self.kind(id) {
            for child in self.children(id).to_vec() {
                self.collect_by_class(child, class, out);
            }
        }
    }

    /// Last direct child of `parent` carrying `class`.
    ///
    /// Matches the `:last-child` lookup the popup rebuild relies on.
    pub fn last_child_by_class(&self, parent: NodeId, class: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .rev()
            .copied()
            .find(|id| self.has_class(*id, class))
    }
}
