//! Message text scanning and in-place rewriting.
//!
//! Scanning is split into a pure planning stage and an application stage:
//! the tree is read once to collect work, every shortcode token is
//! resolved concurrently, and only then is the leaf swapped for its
//! replacement in one critical section. A leaf with no resolvable token
//! is left byte-for-byte untouched.

use std::sync::{Arc, Mutex};

use chat_dom::{DomTree, NodeId, NodeKind};
use futures_util::future::join_all;
use seventv_client::{EmoteDirectory, EmoteRef, EmoteResolver};

use crate::config::EngineConfig;
use crate::{exclude, lock_tree, render};

/// One whitespace-delimited fragment of message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanUnit {
    /// Literal text, passed through unchanged.
    Text(String),
    /// A `:name:` shortcode candidate; the inner name.
    Candidate(String),
}

/// Classify one token against the shortcode pattern: `:` + one-or-more of
/// letters, digits, underscore (colon-separated segments allowed) + `:`,
/// case-insensitive.
pub fn classify(token: &str) -> ScanUnit {
    match shortcode_name(token) {
        Some(name) => ScanUnit::Candidate(name.to_string()),
        None => ScanUnit::Text(token.to_string()),
    }
}

fn shortcode_name(token: &str) -> Option<&str> {
    let inner = token.strip_prefix(':')?.strip_suffix(':')?;
    if inner.is_empty() {
        return None;
    }
    inner
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        .then_some(inner)
}

/// One piece of a rebuilt leaf, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Emote(EmoteRef),
}

/// The replacement decision for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafPlan {
    /// No token resolved; do not touch the leaf at all.
    Unchanged,
    /// Swap the leaf for this sequence.
    Replace(Vec<Segment>),
}

/// Fold resolved tokens back into an alternating segment sequence.
///
/// Adjacent unresolved tokens coalesce into one text run rejoined with
/// single spaces; text runs keep a space on the side facing an emote so
/// the rendered line spaces exactly like the source text.
pub fn rebuild_plan(resolved: Vec<(String, Option<EmoteRef>)>) -> LeafPlan {
    if resolved.iter().all(|(_, emote)| emote.is_none()) {
        return LeafPlan::Unchanged;
    }

    let mut segments: Vec<Segment> = Vec::new();
    for (token, emote) in resolved {
        match emote {
            Some(emote) => {
                if let Some(Segment::Text(run)) = segments.last_mut() {
                    run.push(' ');
                }
                segments.push(Segment::Emote(emote));
            }
            None => match segments.last_mut() {
                Some(Segment::Text(run)) => {
                    run.push(' ');
                    run.push_str(&token);
                }
                Some(Segment::Emote(_)) => segments.push(Segment::Text(format!(" {token}"))),
                None => segments.push(Segment::Text(token)),
            },
        }
    }
    LeafPlan::Replace(segments)
}

/// A rewrite target collected from one message subtree.
#[derive(Debug)]
enum WorkItem {
    /// An emoji-rendered element whose entire content is one shortcode.
    WholeUnit { node: NodeId, name: String },
    /// A text leaf that may contain shortcode tokens.
    TextLeaf { node: NodeId, content: String },
}

fn collect_work(tree: &DomTree, config: &EngineConfig, message: NodeId) -> Vec<WorkItem> {
    let Some(body) = tree.find_by_class(message, &config.selectors.message_body_class) else {
        return Vec::new();
    };
    // The body may itself sit inside a code element; exclusion covers the
    // whole ancestor chain up to the message root.
    if exclude::is_excluded(tree, body, message) {
        return Vec::new();
    }
    let mut out = Vec::new();
    walk(tree, config, body, &mut out);
    out
}

fn walk(tree: &DomTree, config: &EngineConfig, node: NodeId, out: &mut Vec<WorkItem>) {
    // Excluded subtrees are not descended into: code content must never
    // generate a resolver call.
    if exclude::is_excluded_element(tree, node) {
        return;
    }
    match tree.kind(node) {
        Some(NodeKind::Text(content)) => {
            let has_candidate = content
                .split(' ')
                .any(|tok| matches!(classify(tok), ScanUnit::Candidate(_)));
            if has_candidate {
                out.push(WorkItem::TextLeaf {
                    node,
                    content: content.clone(),
                });
            }
        }
        Some(NodeKind::Element { .. }) => {
            if tree.attr(node, "role") == Some(config.selectors.emoji_role.as_str()) {
                let trimmed = tree.text_content(node).trim().to_string();
                if let ScanUnit::Candidate(name) = classify(&trimmed) {
                    out.push(WorkItem::WholeUnit { node, name });
                }
                return;
            }
            for child in tree.children(node).to_vec() {
                walk(tree, config, child, out);
            }
        }
        None => {}
    }
}

/// Scan one message node and rewrite every resolvable shortcode in it.
pub async fn scan_message<D: EmoteDirectory>(
    tree: &Arc<Mutex<DomTree>>,
    resolver: &EmoteResolver<D>,
    config: &EngineConfig,
    message: NodeId,
) {
    let work = match lock_tree(tree) {
        Some(guard) => collect_work(&guard, config, message),
        None => return,
    };

    for item in work {
        match item {
            WorkItem::WholeUnit { node, name } => {
                let Some(emote) = resolver.resolve_exact(&name).await else {
                    continue;
                };
                let Some(mut guard) = lock_tree(tree) else {
                    continue;
                };
                if !guard.is_attached(node) {
                    continue;
                }
                let replacement = render::create_emote_node(&mut guard, &emote, config.render_style);
                if let Err(e) = guard.replace_with(node, vec![replacement]) {
                    tracing::warn!(error = %e, "Failed to replace emoji unit");
                }
            }
            WorkItem::TextLeaf { node, content } => {
                let resolutions = join_all(content.split(' ').map(|token| {
                    let token = token.to_string();
                    async move {
                        let emote = match classify(&token) {
                            ScanUnit::Candidate(name) => resolver.resolve_exact(&name).await,
                            ScanUnit::Text(_) => None,
                        };
                        (token, emote)
                    }
                }))
                .await;

                let LeafPlan::Replace(segments) = rebuild_plan(resolutions) else {
                    continue;
                };
                let Some(mut guard) = lock_tree(tree) else {
                    continue;
                };
                if !guard.is_attached(node) {
                    continue;
                }
                apply_plan(&mut guard, node, &segments, config);
            }
        }
    }
}

fn apply_plan(tree: &mut DomTree, leaf: NodeId, segments: &[Segment], config: &EngineConfig) {
    let replacements: Vec<NodeId> = segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => tree.create_text(text.clone()),
            Segment::Emote(emote) => render::create_emote_node(tree, emote, config.render_style),
        })
        .collect();
    if let Err(e) = tree.replace_with(leaf, replacements) {
        tracing::warn!(error = %e, "Failed to replace text leaf");
    }
}
