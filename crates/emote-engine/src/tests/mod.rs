//! Engine test fixtures: a Rocket.Chat-shaped page and a scripted
//! directory double.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_dom::{DomTree, NodeId};
use seventv_client::{
    EmoteDirectory, EmoteFile, EmoteHost, EmoteRecord, EmoteResolver, EmoteStore, SevenTvError,
};

use crate::config::EngineConfig;

mod watch;

pub(crate) fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a directory record with a single `2x.webp` file.
pub(crate) fn record(name: &str) -> EmoteRecord {
    EmoteRecord {
        id: format!("id-{name}"),
        name: name.to_string(),
        owner: None,
        host: Some(EmoteHost {
            url: format!("//cdn.7tv.app/emote/{name}"),
            files: vec![EmoteFile {
                name: "2x.webp".into(),
                format: Some("WEBP".into()),
                width: Some(64),
                height: Some(64),
            }],
        }),
    }
}

/// Scripted [`EmoteDirectory`] double.
///
/// Exact lookups resolve against registered names (case-insensitive);
/// non-exact searches return one `result_{query}` record so tests can tell
/// which query produced a render. Optional per-query latency makes
/// completion-order races reproducible under the paused clock.
pub(crate) struct StubDirectory {
    emotes: HashMap<String, EmoteRecord>,
    latency_ms: HashMap<String, u64>,
    pub(crate) calls: Mutex<Vec<(String, bool)>>,
    pub(crate) call_count: AtomicUsize,
}

impl StubDirectory {
    pub(crate) fn with_emotes(names: &[&str]) -> Self {
        let emotes = names
            .iter()
            .map(|n| (n.to_lowercase(), record(n)))
            .collect();
        Self {
            emotes,
            latency_ms: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_latency(mut self, query: &str, ms: u64) -> Self {
        self.latency_ms.insert(query.to_lowercase(), ms);
        self
    }

    pub(crate) fn calls_made(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<(String, bool)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl EmoteDirectory for StubDirectory {
    async fn search(
        &self,
        query: &str,
        _limit: u32,
        exact_match: bool,
    ) -> Result<Vec<EmoteRecord>, SevenTvError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .expect("calls lock")
            .push((query.to_string(), exact_match));

        let key = query.to_lowercase();
        if let Some(ms) = self.latency_ms.get(&key) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }

        if exact_match {
            Ok(self.emotes.get(&key).cloned().into_iter().collect())
        } else if query == "nomatch" {
            Ok(Vec::new())
        } else {
            Ok(vec![record(&format!("result_{query}"))])
        }
    }
}

pub(crate) type SharedTree = Arc<Mutex<DomTree>>;

pub(crate) fn resolver(directory: StubDirectory) -> Arc<EmoteResolver<StubDirectory>> {
    Arc::new(EmoteResolver::new(directory, EmoteStore::in_memory()))
}

pub(crate) fn config() -> EngineConfig {
    EngineConfig::default()
}

/// Ids of the interesting fixture nodes.
pub(crate) struct Page {
    pub(crate) timeline: NodeId,
    pub(crate) composer: NodeId,
    pub(crate) popup: NodeId,
    pub(crate) popup_chrome: NodeId,
    pub(crate) popup_list: NodeId,
}

/// Assemble the main view: message list, footer with composer and
/// suggestion popup (title chrome plus replaceable list body).
pub(crate) fn build_page(tree: &mut DomTree) -> Page {
    let root = tree.root();

    let timeline = tree.create_element("ul");
    tree.add_class(timeline, "messages-list");
    tree.append_child(root, timeline).unwrap();

    let footer = tree.create_element("footer");
    tree.append_child(root, footer).unwrap();

    let composer = tree.create_element("textarea");
    tree.add_class(composer, "rc-message-box__textarea");
    tree.append_child(footer, composer).unwrap();

    let popup = tree.create_element("div");
    tree.set_attr(popup, "role", "menu");
    tree.append_child(footer, popup).unwrap();

    let popup_chrome = tree.create_element("div");
    tree.add_class(popup_chrome, "rcx-box");
    tree.append_child(popup, popup_chrome).unwrap();

    let popup_list = tree.create_element("div");
    tree.add_class(popup_list, "rcx-box");
    tree.add_class(popup_list, "rcx-box--full");
    tree.append_child(popup, popup_list).unwrap();

    Page {
        timeline,
        composer,
        popup,
        popup_chrome,
        popup_list,
    }
}

/// Add the thread panel: contextual bar with its own list, footer,
/// composer, and popup.
pub(crate) struct ThreadPanel {
    pub(crate) panel: NodeId,
    pub(crate) list: NodeId,
    pub(crate) composer: NodeId,
    pub(crate) popup_list: NodeId,
}

pub(crate) fn build_thread_panel(tree: &mut DomTree) -> ThreadPanel {
    let root = tree.root();

    let panel = tree.create_element("div");
    tree.set_attr(panel, "aria-labelledby", "contextualbarTitle");
    tree.append_child(root, panel).unwrap();

    let list = tree.create_element("ul");
    tree.add_class(list, "thread");
    tree.append_child(panel, list).unwrap();

    let footer = tree.create_element("footer");
    tree.append_child(panel, footer).unwrap();

    let composer = tree.create_element("textarea");
    tree.add_class(composer, "rc-message-box__textarea");
    tree.append_child(footer, composer).unwrap();

    let popup = tree.create_element("div");
    tree.set_attr(popup, "role", "menu");
    tree.append_child(footer, popup).unwrap();

    let popup_list = tree.create_element("div");
    tree.add_class(popup_list, "rcx-box");
    tree.add_class(popup_list, "rcx-box--full");
    tree.append_child(popup, popup_list).unwrap();

    ThreadPanel {
        panel,
        list,
        composer,
        popup_list,
    }
}

/// Append one `div.rcx-message > div.rcx-message-body > text` node.
pub(crate) fn push_message(tree: &mut DomTree, list: NodeId, text: &str) -> (NodeId, NodeId) {
    let message = tree.create_element("div");
    tree.add_class(message, "rcx-message");
    let body = tree.create_element("div");
    tree.add_class(body, "rcx-message-body");
    let leaf = tree.create_text(text);
    tree.append_child(body, leaf).unwrap();
    tree.append_child(message, body).unwrap();
    tree.append_child(list, message).unwrap();
    (message, leaf)
}

/// Flatten a message body into (tag-or-text, title-attr) pairs for
/// asserting rewrite results.
pub(crate) fn body_shape(tree: &DomTree, message: NodeId) -> Vec<(String, Option<String>)> {
    let body = tree
        .find_by_class(message, "rcx-message-body")
        .expect("message body");
    tree.children(body)
        .iter()
        .map(|child| match tree.tag(*child) {
            Some(tag) => (
                tag.to_string(),
                tree.attr(*child, "title").map(str::to_string),
            ),
            None => (
                format!("#text:{}", tree.text(*child).unwrap_or_default()),
                None,
            ),
        })
        .collect()
}
