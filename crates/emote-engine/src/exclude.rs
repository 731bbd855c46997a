//! Code/preformatted exclusion.
//!
//! Shortcode-looking strings inside code blocks are content, not emotes.
//! The scanner skips excluded subtrees entirely, so code never generates
//! resolver calls.

use chat_dom::{DomTree, NodeId};

const EXCLUDED_TAGS: &[&str] = &["code", "pre"];

/// Whether this node itself is a code/preformatted element.
pub(crate) fn is_excluded_element(tree: &DomTree, node: NodeId) -> bool {
    match tree.tag(node) {
        Some(tag) => EXCLUDED_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t)),
        None => false,
    }
}

/// Whether `node` or any ancestor up to (and including) `root` is a
/// code/preformatted element.
pub fn is_excluded(tree: &DomTree, node: NodeId, root: NodeId) -> bool {
    let mut cur = Some(node);
    while let Some(id) = cur {
        if is_excluded_element(tree, id) {
            return true;
        }
        if id == root {
            break;
        }
        cur = tree.parent(id);
    }
    false
}
