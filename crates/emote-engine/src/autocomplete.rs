//! Composer autocomplete.
//!
//! Every composer input event extracts the in-progress shortcode after
//! the last colon, debounces it, and turns the survivor into one directory
//! search whose results rebuild the suggestion-list body. Queries raced
//! out by newer input are never executed; results raced out while in
//! flight are discarded by the last-executed-query check.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_dom::{DomTree, NodeId};
use seventv_client::{EmoteDirectory, EmoteRecord, EmoteResolver};
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::{lock_tree, render};

/// Which composer an input event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposerContext {
    Main,
    Thread,
}

/// Single-slot cancellable debounce timer.
///
/// Arming the slot aborts whatever was armed before; only the last query
/// in a burst ever fires.
#[derive(Default)]
struct DebounceSlot {
    timer: Option<JoinHandle<()>>,
}

impl DebounceSlot {
    fn arm(&mut self, handle: JoinHandle<()>) {
        if let Some(prev) = self.timer.replace(handle) {
            prev.abort();
        }
    }

    fn cancel(&mut self) {
        if let Some(prev) = self.timer.take() {
            prev.abort();
        }
    }
}

/// Runs the suggestion popup for both composer contexts.
///
/// Owns one [`DebounceSlot`] per context; at most one pending query per
/// composer at any time.
pub struct AutocompleteController<D> {
    tree: Arc<Mutex<DomTree>>,
    resolver: Arc<EmoteResolver<D>>,
    config: Arc<EngineConfig>,
    composers: HashMap<ComposerContext, NodeId>,
    slots: HashMap<ComposerContext, DebounceSlot>,
    last_executed: Arc<Mutex<HashMap<ComposerContext, String>>>,
}

impl<D: EmoteDirectory + 'static> AutocompleteController<D> {
    pub fn new(
        tree: Arc<Mutex<DomTree>>,
        resolver: Arc<EmoteResolver<D>>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            tree,
            resolver,
            config,
            composers: HashMap::new(),
            slots: HashMap::new(),
            last_executed: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Bind a located composer input for a context.
    pub fn bind(&mut self, context: ComposerContext, composer: NodeId) {
        self.composers.insert(context, composer);
    }

    pub fn composer(&self, context: ComposerContext) -> Option<NodeId> {
        self.composers.get(&context).copied()
    }

    /// Drop one binding (its composer left the tree).
    pub fn unbind(&mut self, context: ComposerContext) {
        self.composers.remove(&context);
        if let Some(slot) = self.slots.get_mut(&context) {
            slot.cancel();
        }
    }

    /// Drop all bindings and cancel pending timers (navigation).
    pub fn unbind_all(&mut self) {
        self.composers.clear();
        for slot in self.slots.values_mut() {
            slot.cancel();
        }
    }

    /// Handle one composer input event.
    pub fn on_input(&mut self, context: ComposerContext, value: &str) {
        if !self.composers.contains_key(&context) {
            return;
        }
        let Some(colon) = value.rfind(':') else {
            return;
        };
        let query = &value[colon + 1..];
        if query.chars().count() < 2 {
            return;
        }

        let query = query.to_string();
        let tree = Arc::clone(&self.tree);
        let resolver = Arc::clone(&self.resolver);
        let config = Arc::clone(&self.config);
        let last_executed = Arc::clone(&self.last_executed);
        let debounce = Duration::from_millis(config.debounce_ms);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            execute_query(&tree, &resolver, &config, &last_executed, context, query).await;
        });
        self.slots.entry(context).or_default().arm(handle);
    }

    /// Apply a selected suggestion: rewrite the composer value from the
    /// last colon onward to `name: `, refocus, and dismiss the popup.
    pub fn select(&self, context: ComposerContext, name: &str) {
        let Some(composer) = self.composer(context) else {
            return;
        };
        let Some(mut guard) = lock_tree(&self.tree) else {
            return;
        };
        let value = guard.attr(composer, "value").unwrap_or_default().to_string();
        let Some(colon) = value.rfind(':') else {
            return;
        };
        let rewritten = format!("{}{}: ", &value[..colon], name);
        guard.set_attr(composer, "value", rewritten);
        guard.focus(composer);
        if let Some(popup) = find_popup(&guard, &self.config, context) {
            if let Err(e) = guard.remove(popup) {
                tracing::warn!(error = %e, "Failed to dismiss suggestion popup");
            }
        }
    }
}

async fn execute_query<D: EmoteDirectory>(
    tree: &Mutex<DomTree>,
    resolver: &EmoteResolver<D>,
    config: &EngineConfig,
    last_executed: &Mutex<HashMap<ComposerContext, String>>,
    context: ComposerContext,
    query: String,
) {
    // Skip a repeat of the query that last executed for this composer.
    {
        let Ok(mut last) = last_executed.lock() else {
            return;
        };
        if last.get(&context) == Some(&query) {
            return;
        }
        last.insert(context, query.clone());
    }

    let results = resolver.search_prefix(&query, config.search_limit).await;

    // A newer query may have executed while we were in flight; its render
    // wins and this result is discarded.
    {
        let Ok(last) = last_executed.lock() else {
            return;
        };
        if last.get(&context) != Some(&query) {
            return;
        }
    }

    // Zero results leave the current list as-is: no empty-state flicker.
    if results.is_empty() {
        return;
    }
    let unique = dedupe_by_name(results);

    let Some(mut guard) = lock_tree(tree) else {
        return;
    };
    let Some(popup) = find_popup(&guard, config, context) else {
        return;
    };
    let Some(old_list) = guard.last_child_by_class(popup, &config.selectors.popup_list_class)
    else {
        return;
    };
    let new_list = render::create_suggestion_list(&mut guard, &unique);
    if let Err(e) = guard.replace_with(old_list, vec![new_list]) {
        tracing::warn!(error = %e, "Failed to swap suggestion list");
    }
}

/// Case-insensitive dedupe by name; the first (most popular) occurrence
/// wins and ordering is preserved.
pub fn dedupe_by_name(records: Vec<EmoteRecord>) -> Vec<EmoteRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.name.to_lowercase()))
        .collect()
}

/// Locate the suggestion popup for a composer context.
///
/// The main popup lives under the page footer; the thread popup under the
/// footer of the open thread panel.
pub(crate) fn find_popup(
    tree: &DomTree,
    config: &EngineConfig,
    context: ComposerContext,
) -> Option<NodeId> {
    let scope = match context {
        ComposerContext::Main => tree.root(),
        ComposerContext::Thread => tree.find_by_attr(
            tree.root(),
            "aria-labelledby",
            &config.selectors.thread_panel_label,
        )?,
    };
    let footer = tree.find_by_tag(scope, "footer")?;
    tree.find_by_attr(footer, "role", &config.selectors.popup_role)
}
