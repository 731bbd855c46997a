//! Node storage for the arena tree.

/// Arena index of one node. Never reused within a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Typed variant over the two node shapes the engine cares about.
#[derive(Debug)]
pub enum NodeKind {
    Element {
        tag: String,
        classes: Vec<String>,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

impl NodeData {
    pub(crate) fn element(tag: String) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element {
                tag,
                classes: Vec::new(),
                attrs: Vec::new(),
            },
        }
    }

    pub(crate) fn text(text: String) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Text(text),
        }
    }
}
