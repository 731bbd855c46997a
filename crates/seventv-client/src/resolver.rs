//! Cache-first emote resolution.

use std::sync::Mutex;

use crate::directory::EmoteDirectory;
use crate::store::EmoteStore;
use crate::wire::EmoteRecord;
use crate::EmoteRef;

/// Autocomplete queries shorter than this never reach the network.
const MIN_QUERY_LEN: usize = 2;

/// Resolves shortcodes and free-text queries against an [`EmoteDirectory`].
///
/// Owns the [`EmoteStore`] exclusively; nothing else writes the cache.
/// All failure modes collapse to "no emote" after a diagnostic log, so
/// callers never have an error to propagate.
pub struct EmoteResolver<D> {
    directory: D,
    store: Mutex<EmoteStore>,
}

impl<D: EmoteDirectory> EmoteResolver<D> {
    pub fn new(directory: D, store: EmoteStore) -> Self {
        Self {
            directory,
            store: Mutex::new(store),
        }
    }

    /// The directory this resolver queries (handy for test doubles).
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Case-insensitive exact lookup, cache first.
    ///
    /// On a cache miss, asks the directory for the single top exact match
    /// and caches the result before returning it. Concurrent lookups of
    /// the same uncached name each run their own query; the duplicate
    /// cache write carries the same value, so the race is benign.
    pub async fn resolve_exact(&self, name: &str) -> Option<EmoteRef> {
        if let Some(hit) = self.cache_get(name) {
            return Some(hit);
        }

        let items = match self.directory.search(name, 1, true).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, name, "Emote lookup failed");
                return None;
            }
        };
        let record = items.into_iter().next()?;
        let image_url = record.display_url()?;
        let emote = EmoteRef {
            name: record.name,
            image_url,
        };

        self.cache_put(name, emote.clone());
        Some(emote)
    }

    /// Ranked free-text search for autocomplete.
    ///
    /// Skips the cache: suggestion freshness matters more than the saved
    /// round-trip. Short queries and any failure yield an empty vec.
    pub async fn search_prefix(&self, query: &str, limit: u32) -> Vec<EmoteRecord> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }
        match self.directory.search(query, limit, false).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, query, "Emote search failed");
                Vec::new()
            }
        }
    }

    fn cache_get(&self, name: &str) -> Option<EmoteRef> {
        match self.store.lock() {
            Ok(store) => store.get(name).cloned(),
            Err(_) => {
                tracing::warn!("Emote store lock poisoned during read");
                None
            }
        }
    }

    fn cache_put(&self, name: &str, emote: EmoteRef) {
        match self.store.lock() {
            Ok(mut store) => store.insert(name, emote),
            Err(_) => tracing::warn!("Emote store lock poisoned during write"),
        }
    }
}
