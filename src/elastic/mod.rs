// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub mod client;
pub use client::{Client, ClientBuilder, Method};
pub mod response;

/// Document type reported for hits that do not carry one, as is the case
/// from Elasticsearch 7 onwards.
pub const DEFAULT_DOC_TYPE: &str = "_doc";

/// A single search hit.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default = "default_doc_type")]
    pub doc_type: String,
    #[serde(rename = "_source", default)]
    pub source: JsonValue,
}

fn default_doc_type() -> String {
    DEFAULT_DOC_TYPE.to_string()
}

/// Extract the hits from a search response. Entries that are not hit
/// objects are logged and skipped.
pub fn hits(response: &JsonValue) -> Vec<Hit> {
    let mut hits = Vec::new();
    if let Some(entries) = response["hits"]["hits"].as_array() {
        for entry in entries {
            match serde_json::from_value::<Hit>(entry.clone()) {
                Ok(hit) => hits.push(hit),
                Err(err) => {
                    tracing::warn!("Skipping malformed search hit: {}", err);
                }
            }
        }
    }
    hits
}

/// The total hit count of a search response. Older versions report an
/// integer, newer versions an object with a `value` field.
pub fn total_hits(response: &JsonValue) -> u64 {
    let total = &response["hits"]["total"];
    match total {
        JsonValue::Number(n) => n.as_u64().unwrap_or(0),
        JsonValue::Object(_) => total["value"].as_u64().unwrap_or(0),
        _ => 0,
    }
}

pub fn timed_out(response: &JsonValue) -> bool {
    response["timed_out"].as_bool().unwrap_or(false)
}

/// One row of the index listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndexInfo {
    pub index: String,
    pub health: Option<String>,
    pub status: Option<String>,
    pub docs_count: Option<u64>,
    pub store_size: Option<String>,
}

impl IndexInfo {
    /// Build from an entry of `_cat/indices?format=json`. Counts are
    /// reported as strings by the cat API.
    pub fn from_cat_entry(entry: &JsonValue) -> Option<Self> {
        let index = entry["index"].as_str()?.to_string();
        let docs_count = match &entry["docs.count"] {
            JsonValue::String(s) => s.parse::<u64>().ok(),
            JsonValue::Number(n) => n.as_u64(),
            _ => None,
        };
        Some(Self {
            index,
            health: entry["health"].as_str().map(String::from),
            status: entry["status"].as_str().map(String::from),
            docs_count,
            store_size: entry["store.size"].as_str().map(String::from),
        })
    }
}
