//! Mutation observation.
//!
//! Mirrors the MutationObserver childList contract: an observer watches
//! one node (optionally its whole subtree) and receives batches of added
//! nodes. Batches queue until drained, matching the host's asynchronous
//! delivery.

use crate::{DomTree, NodeId};

/// One delivered mutation: nodes added under `target`.
#[derive(Debug, Clone)]
pub struct MutationBatch {
    pub target: NodeId,
    pub added: Vec<NodeId>,
}

/// Handle to an active observation.
///
/// Deliberately not `Clone`: the owning component must hand it back via
/// [`DomTree::disconnect`], which is how leaked observers stay visible.
#[derive(Debug)]
pub struct ObserverHandle {
    pub(crate) id: u32,
    pub(crate) target: NodeId,
}

impl ObserverHandle {
    /// The node this observation was registered on.
    pub fn target(&self) -> NodeId {
        self.target
    }
}

#[derive(Debug)]
pub(crate) struct ObserverState {
    pub(crate) target: NodeId,
    pub(crate) subtree: bool,
    pub(crate) pending: Vec<MutationBatch>,
}

impl DomTree {
    /// Begin observing child additions under `target`.
    ///
    /// With `subtree` set, additions anywhere below `target` are reported;
    /// otherwise only direct children, as the message-list observers use.
    pub fn observe(&mut self, target: NodeId, subtree: bool) -> ObserverHandle {
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.insert(
            id,
            ObserverState {
                target,
                subtree,
                pending: Vec::new(),
            },
        );
        ObserverHandle { id, target }
    }

    /// Drain the queued batches for an observation, oldest first.
    pub fn take_batches(&mut self, handle: &ObserverHandle) -> Vec<MutationBatch> {
        match self.observers.get_mut(&handle.id) {
            Some(state) => std::mem::take(&mut state.pending),
            None => Vec::new(),
        }
    }

    /// Release an observation handle.
    pub fn disconnect(&mut self, handle: ObserverHandle) {
        if self.observers.remove(&handle.id).is_none() {
            tracing::warn!(observer = handle.id, "Disconnected an unknown observer");
        }
    }

    /// Number of live observations (leak check for tests).
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify_added(&mut self, parent: NodeId, added: &[NodeId]) {
        if added.is_empty() {
            return;
        }
        let matching: Vec<u32> = self
            .observers
            .iter()
            .filter(|(_, state)| {
                state.target == parent || (state.subtree && self.is_below(parent, state.target))
            })
            .map(|(id, _)| *id)
            .collect();
        for id in matching {
            if let Some(state) = self.observers.get_mut(&id) {
                state.pending.push(MutationBatch {
                    target: parent,
                    added: added.to_vec(),
                });
            }
        }
    }

    /// Whether `node` is `ancestor` or sits below it.
    fn is_below(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }
}
