//! The emote directory network boundary.
//!
//! [`EmoteDirectory`] is the seam the resolver talks through, so tests can
//! drive the pipeline with a scripted double instead of the live API.

use std::future::Future;

use crate::wire::{self, EmoteRecord};
use crate::SevenTvError;

/// A searchable emote directory.
pub trait EmoteDirectory: Send + Sync {
    /// Search the directory, popularity-descending.
    ///
    /// `exact_match` asks the directory for name-equality matching; the
    /// autocomplete path passes `false` for prefix-style search.
    fn search(
        &self,
        query: &str,
        limit: u32,
        exact_match: bool,
    ) -> impl Future<Output = Result<Vec<EmoteRecord>, SevenTvError>> + Send;
}

/// The live 7TV GraphQL directory.
pub struct GqlDirectory {
    http: reqwest::Client,
    endpoint: String,
}

impl GqlDirectory {
    pub fn new() -> Self {
        Self::with_endpoint(wire::API_URL)
    }

    /// Point the client at a non-default endpoint (proxies, test servers).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for GqlDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl EmoteDirectory for GqlDirectory {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        exact_match: bool,
    ) -> Result<Vec<EmoteRecord>, SevenTvError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&wire::search_request_body(query, limit, exact_match))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(SevenTvError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        wire::parse_search_response(&body)
    }
}
