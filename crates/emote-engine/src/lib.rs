//! Emote integration engine.
//!
//! Watches the chat render tree for newly rendered messages, rewrites
//! `:shortcode:` text into rendered emotes via the 7TV resolver, and runs
//! the composer autocomplete popup. The [`supervisor::Supervisor`] is the
//! top-level loop that keeps everything wired across single-page
//! navigation and panel churn.

pub mod autocomplete;
pub mod config;
pub mod exclude;
pub mod render;
pub mod scan;
pub mod supervisor;
pub mod watch;

#[cfg(test)]
mod tests;

use std::sync::{Mutex, MutexGuard};

use chat_dom::DomTree;

pub use autocomplete::{AutocompleteController, ComposerContext};
pub use config::{EngineConfig, RenderStyle, Selectors};
pub use supervisor::Supervisor;
pub use watch::{ContainerKind, ContainerWatcher};

/// Lock the shared render tree, logging instead of panicking on poison.
///
/// A poisoned tree means a handler panicked mid-rewrite; the engine
/// degrades to leaving text un-rewritten rather than taking the host down.
pub(crate) fn lock_tree(tree: &Mutex<DomTree>) -> Option<MutexGuard<'_, DomTree>> {
    match tree.lock() {
        Ok(guard) => Some(guard),
        Err(_) => {
            tracing::warn!("Render tree lock poisoned, skipping");
            None
        }
    }
}
