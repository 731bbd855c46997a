//! Top-level supervision loop.
//!
//! The supervisor observes the whole page, detects single-page navigation
//! by URL change, and keeps the container watchers and the autocomplete
//! controller wired to whatever the host has currently rendered. The
//! host's panels appear on a delay relative to the URL update, so
//! discovery is re-run idempotently on every pump, not only on
//! navigation.

use std::sync::{Arc, Mutex};

use chat_dom::{DomTree, NodeId, ObserverHandle};
use seventv_client::{EmoteDirectory, EmoteResolver};

use crate::autocomplete::{AutocompleteController, ComposerContext};
use crate::config::EngineConfig;
use crate::watch::{ContainerKind, ContainerWatcher};
use crate::lock_tree;

/// Wires watchers and autocomplete across page lifecycle changes.
pub struct Supervisor<D> {
    tree: Arc<Mutex<DomTree>>,
    resolver: Arc<EmoteResolver<D>>,
    config: Arc<EngineConfig>,
    page_observer: Option<ObserverHandle>,
    timeline: ContainerWatcher,
    thread: ContainerWatcher,
    autocomplete: AutocompleteController<D>,
    current_url: String,
}

impl<D: EmoteDirectory + 'static> Supervisor<D> {
    /// Attach to the page and start supervising.
    pub fn new(
        tree: Arc<Mutex<DomTree>>,
        resolver: Arc<EmoteResolver<D>>,
        config: EngineConfig,
    ) -> Self {
        let config = Arc::new(config);
        let (page_observer, current_url) = match lock_tree(&tree) {
            Some(mut guard) => {
                let root = guard.root();
                let observer = guard.observe(root, true);
                (Some(observer), guard.location().to_string())
            }
            None => (None, String::new()),
        };
        let autocomplete = AutocompleteController::new(
            Arc::clone(&tree),
            Arc::clone(&resolver),
            Arc::clone(&config),
        );
        Self {
            tree,
            resolver,
            config,
            page_observer,
            timeline: ContainerWatcher::new(ContainerKind::Timeline),
            thread: ContainerWatcher::new(ContainerKind::Thread),
            autocomplete,
            current_url,
        }
    }

    /// Run one supervision round: drain page mutations, handle navigation,
    /// rediscover anything unattached, and pump both watchers.
    pub async fn pump(&mut self) {
        let url_changed = {
            let Some(mut guard) = lock_tree(&self.tree) else {
                return;
            };
            if let Some(observer) = &self.page_observer {
                // Page-level batches only signal "something changed";
                // discovery below re-checks the tree itself.
                let _ = guard.take_batches(observer);
            }
            let url = guard.location().to_string();
            let changed = url != self.current_url;
            if changed {
                self.current_url = url;
            }
            changed
        };

        if url_changed {
            tracing::debug!(url = %self.current_url, "Navigation detected, rewiring");
            self.timeline.detach(&self.tree);
            self.thread.detach(&self.tree);
            self.autocomplete.unbind_all();
        }

        self.timeline
            .discover(&self.tree, &self.resolver, &self.config)
            .await;
        self.thread
            .discover(&self.tree, &self.resolver, &self.config)
            .await;
        self.discover_composers();

        self.timeline
            .pump(&self.tree, &self.resolver, &self.config)
            .await;
        self.thread
            .pump(&self.tree, &self.resolver, &self.config)
            .await;
    }

    /// Forward a composer input event.
    pub fn on_composer_input(&mut self, context: ComposerContext, value: &str) {
        self.autocomplete.on_input(context, value);
    }

    /// Forward a suggestion selection.
    pub fn select_suggestion(&self, context: ComposerContext, name: &str) {
        self.autocomplete.select(context, name);
    }

    pub fn timeline_attached(&self) -> bool {
        self.timeline.is_attached()
    }

    pub fn thread_attached(&self) -> bool {
        self.thread.is_attached()
    }

    pub fn composer(&self, context: ComposerContext) -> Option<NodeId> {
        self.autocomplete.composer(context)
    }

    /// Release every observation handle (host page teardown).
    pub fn shutdown(&mut self) {
        self.timeline.detach(&self.tree);
        self.thread.detach(&self.tree);
        self.autocomplete.unbind_all();
        if let Some(observer) = self.page_observer.take() {
            if let Some(mut guard) = lock_tree(&self.tree) {
                guard.disconnect(observer);
            }
        }
    }

    /// Bind composers for whatever panels are currently rendered.
    ///
    /// Already-bound composers that left the tree are dropped so a
    /// recreated input gets rebound on the next pump.
    fn discover_composers(&mut self) {
        let Some(guard) = lock_tree(&self.tree) else {
            return;
        };
        let root = guard.root();
        let selectors = &self.config.selectors;

        for context in [ComposerContext::Main, ComposerContext::Thread] {
            if let Some(bound) = self.autocomplete.composer(context) {
                if guard.is_attached(bound) {
                    continue;
                }
                self.autocomplete.unbind(context);
            }
            let composer = match context {
                ComposerContext::Main => guard.find_by_class(root, &selectors.composer_class),
                ComposerContext::Thread => guard
                    .find_by_attr(root, "aria-labelledby", &selectors.thread_panel_label)
                    .and_then(|panel| guard.find_by_class(panel, &selectors.composer_class)),
            };
            if let Some(composer) = composer {
                self.autocomplete.bind(context, composer);
            }
        }
    }
}
