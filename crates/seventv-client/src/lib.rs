//! 7TV emote directory client.
//!
//! Resolves `:shortcode:` names against the 7TV GraphQL search API and
//! keeps a flat, persistent name -> emote cache so repeat lookups never
//! touch the network.

pub mod directory;
pub mod resolver;
pub mod store;
pub mod wire;

use serde::{Deserialize, Serialize};

pub use directory::{EmoteDirectory, GqlDirectory};
pub use resolver::EmoteResolver;
pub use store::EmoteStore;
pub use wire::{EmoteFile, EmoteHost, EmoteOwner, EmoteRecord};

/// A resolved emote: its canonical name and the display image URL.
///
/// Identified by case-insensitive name; immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteRef {
    pub name: String,
    pub image_url: String,
}

/// Unified error type for the seventv-client crate.
#[derive(Debug, thiserror::Error)]
pub enum SevenTvError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("7TV API error (status {status}): {message}")]
    ApiError { status: u16, message: String },
}
