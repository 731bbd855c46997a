//! Per-container render-tree watching.
//!
//! Each watched container (main timeline, open thread panel) runs a small
//! state machine: `Unattached` until the container element exists, then
//! `Attached` with a live observation handle. Attachment always backfills
//! every message already present, because a recreated container has lost
//! all prior rewrites. The handle is disconnected before the state falls
//! back to `Unattached`; observers are never leaked.

use std::sync::{Arc, Mutex};

use chat_dom::{DomTree, MutationBatch, NodeId, ObserverHandle};
use seventv_client::{EmoteDirectory, EmoteResolver};

use crate::config::EngineConfig;
use crate::{lock_tree, scan};

/// Which chat container a watcher is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Timeline,
    Thread,
}

impl ContainerKind {
    fn list_class<'a>(&self, config: &'a EngineConfig) -> &'a str {
        match self {
            ContainerKind::Timeline => &config.selectors.timeline_class,
            ContainerKind::Thread => &config.selectors.thread_class,
        }
    }
}

enum WatchState {
    Unattached,
    Attached {
        container: NodeId,
        observer: ObserverHandle,
    },
}

/// Watches one container for message additions.
pub struct ContainerWatcher {
    kind: ContainerKind,
    state: WatchState,
}

impl ContainerWatcher {
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            state: WatchState::Unattached,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, WatchState::Attached { .. })
    }

    /// Idempotent discovery: locate the container, attach an observer, and
    /// backfill every message currently present. A no-op while attached.
    pub async fn discover<D: EmoteDirectory>(
        &mut self,
        tree: &Arc<Mutex<DomTree>>,
        resolver: &EmoteResolver<D>,
        config: &EngineConfig,
    ) {
        if self.is_attached() {
            return;
        }

        // Locate, observe, and snapshot the backfill in one critical
        // section so no addition can slip between snapshot and observe.
        let backfill = {
            let Some(mut guard) = lock_tree(tree) else {
                return;
            };
            let root = guard.root();
            let Some(container) =
                guard.find_by_tag_class(root, "ul", self.kind.list_class(config))
            else {
                return;
            };
            let observer = guard.observe(container, false);
            let messages = guard.find_all_by_class(container, &config.selectors.message_class);
            self.state = WatchState::Attached {
                container,
                observer,
            };
            tracing::debug!(kind = ?self.kind, count = messages.len(), "Container attached");
            messages
        };

        for message in backfill {
            scan::scan_message(tree, resolver, config, message).await;
        }
    }

    /// Process queued mutation batches; tear down if the container is gone.
    pub async fn pump<D: EmoteDirectory>(
        &mut self,
        tree: &Arc<Mutex<DomTree>>,
        resolver: &EmoteResolver<D>,
        config: &EngineConfig,
    ) {
        let WatchState::Attached { container, observer } = &self.state else {
            return;
        };
        let container = *container;

        let (gone, batches) = {
            let Some(mut guard) = lock_tree(tree) else {
                return;
            };
            let gone = !guard.is_attached(container);
            let batches = guard.take_batches(observer);
            (gone, batches)
        };

        if gone {
            self.detach(tree);
            return;
        }

        for message in added_messages(tree, config, container, &batches) {
            scan::scan_message(tree, resolver, config, message).await;
        }
    }

    /// Release the observation handle and fall back to `Unattached`.
    ///
    /// The next `discover` re-runs a full backfill.
    pub fn detach(&mut self, tree: &Arc<Mutex<DomTree>>) {
        let state = std::mem::replace(&mut self.state, WatchState::Unattached);
        if let WatchState::Attached { observer, .. } = state {
            if let Some(mut guard) = lock_tree(tree) {
                guard.disconnect(observer);
            }
            tracing::debug!(kind = ?self.kind, "Container detached");
        }
    }
}

/// Filter batches down to direct message-node additions. Non-message
/// additions (typing indicators and the like) are ignored.
fn added_messages(
    tree: &Arc<Mutex<DomTree>>,
    config: &EngineConfig,
    container: NodeId,
    batches: &[MutationBatch],
) -> Vec<NodeId> {
    let Some(guard) = lock_tree(tree) else {
        return Vec::new();
    };
    batches
        .iter()
        .filter(|batch| batch.target == container)
        .flat_map(|batch| batch.added.iter().copied())
        .filter(|node| guard.has_class(*node, &config.selectors.message_class))
        .collect()
}
