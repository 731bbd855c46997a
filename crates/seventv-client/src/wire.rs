//! 7TV GraphQL wire protocol: request construction and response parsing.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::SevenTvError;

/// 7TV GraphQL endpoint.
pub const API_URL: &str = "https://7tv.io/v3/gql";

/// Preferred raster variant for display.
const PREFERRED_FILE: &str = "2x.webp";

const SEARCH_QUERY: &str = "\
query SearchEmotes($query: String!, $page: Int, $sort: Sort, $limit: Int, $filter: EmoteSearchFilter) {
  emotes(query: $query, page: $page, sort: $sort, limit: $limit, filter: $filter) {
    items {
      id
      name
      owner { username }
      host {
        url
        files { name format width height }
      }
    }
  }
}";

/// Build the `SearchEmotes` request body.
///
/// Exact-match lookups use `limit = 1`; autocomplete uses a larger limit
/// with `exact_match = false`. Results are always sorted by descending
/// popularity, case-insensitively.
pub fn search_request_body(query: &str, limit: u32, exact_match: bool) -> Value {
    json!({
        "operationName": "SearchEmotes",
        "variables": {
            "query": query,
            "limit": limit,
            "page": 1,
            "sort": { "value": "popularity", "order": "DESCENDING" },
            "filter": {
                "category": "TOP",
                "exact_match": exact_match,
                "case_sensitive": false,
                "ignore_tags": false,
                "zero_width": false,
                "animated": false,
                "aspect_ratio": ""
            }
        },
        "query": SEARCH_QUERY,
    })
}

/// One emote record as returned by the directory.
///
/// `owner` and `host` are optional on the wire; a record without a usable
/// host is treated as a miss by callers, never as an error.
#[derive(Debug, Clone, Deserialize)]
pub struct EmoteRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<EmoteOwner>,
    #[serde(default)]
    pub host: Option<EmoteHost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmoteOwner {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmoteHost {
    pub url: String,
    #[serde(default)]
    pub files: Vec<EmoteFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmoteFile {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl EmoteRecord {
    /// Derive the display URL: `host.url + "/" + file.name`, preferring the
    /// canonical double-resolution file, else the first listed file.
    ///
    /// Returns `None` when the record carries no host or no files.
    pub fn display_url(&self) -> Option<String> {
        let host = self.host.as_ref()?;
        let file = host
            .files
            .iter()
            .find(|f| f.name == PREFERRED_FILE)
            .or_else(|| host.files.first())?;
        Some(format!("{}/{}", host.url, file.name))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    emotes: Option<EmoteList>,
}

#[derive(Debug, Deserialize)]
struct EmoteList {
    #[serde(default)]
    items: Vec<EmoteRecord>,
}

/// Parse a search response body into its emote records.
///
/// A response missing `data`, `emotes`, or `items` yields an empty vec.
pub fn parse_search_response(body: &str) -> Result<Vec<EmoteRecord>, SevenTvError> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(resp
        .data
        .and_then(|d| d.emotes)
        .map(|e| e.items)
        .unwrap_or_default())
}
