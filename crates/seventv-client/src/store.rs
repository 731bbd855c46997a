//! Persistent resolution cache.
//!
//! A flat shortcode -> [`EmoteRef`] document, read once at startup and
//! rewritten in full on every new resolution. Append-only: there is no
//! eviction, no TTL, and no invalidation path; a cached entry is always
//! trusted over a fresh network result.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::EmoteRef;

/// Flat name -> emote cache with optional file persistence.
pub struct EmoteStore {
    path: Option<PathBuf>,
    entries: HashMap<String, EmoteRef>,
}

impl EmoteStore {
    /// Open the store backed by a JSON document at `path`.
    ///
    /// A missing or unreadable document loads as an empty store; the cache
    /// is an accelerator, never a hard dependency.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(body) => match serde_json::from_str(&body) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Emote cache is malformed, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to read emote cache, starting empty");
                HashMap::new()
            }
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Create a store with no backing file (for testing).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: HashMap::new(),
        }
    }

    /// Case-insensitive lookup by shortcode name.
    pub fn get(&self, name: &str) -> Option<&EmoteRef> {
        self.entries.get(&name.to_lowercase())
    }

    /// Insert a resolution and rewrite the backing document.
    ///
    /// Concurrent resolutions of the same name may both land here; the
    /// values are expected to be equal, so last-write-wins is benign.
    pub fn insert(&mut self, name: &str, emote: EmoteRef) {
        self.entries.insert(name.to_lowercase(), emote);
        self.persist();
    }

    /// Number of cached resolutions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let body = match serde_json::to_string(&self.entries) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize emote cache");
                return;
            }
        };
        if let Err(e) = std::fs::write(path, body) {
            tracing::warn!(error = %e, path = %path.display(), "Failed to write emote cache");
        }
    }
}
