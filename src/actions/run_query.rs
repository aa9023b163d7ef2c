// SPDX-License-Identifier: MIT

use super::{ActionResult, SUMMARY_TIMED_OUT, SUMMARY_TOTAL_HITS};
use crate::elastic::{self, Client, Method};
use crate::host::Host;
use crate::prelude::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryParams {
    /// Comma separated list of indices.
    pub index: String,
    /// The query, as a JSON encoded string.
    pub query: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
}

/// Trim each comma separated index name and drop the blanks.
pub fn normalize_index(index: &str) -> Result<String, ConnectorError> {
    let indices: Vec<&str> = index
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if indices.is_empty() {
        return Err(ConnectorError::Validation(
            "Please provide a valid value in the 'index' action parameter".to_string(),
        ));
    }
    Ok(indices.join(","))
}

fn parse_query(query: &str) -> Result<JsonValue, ConnectorError> {
    serde_json::from_str(query).map_err(|err| {
        ConnectorError::Validation(format!("Unable to load query json. Error: {err}"))
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Validate the parameters and execute the search, returning the raw
/// response. Validation happens before any request is made.
pub async fn execute_query<H: Host>(
    host: &mut H,
    client: &Client,
    params: &QueryParams,
) -> Result<JsonValue, ConnectorError> {
    let index = normalize_index(&params.index)?;
    let query = parse_query(&params.query)?;

    let path = match non_empty(&params.doc_type) {
        Some(doc_type) => format!("/{index}/{doc_type}/_search"),
        None => format!("/{index}/_search"),
    };
    let mut query_params = Vec::new();
    if let Some(routing) = non_empty(&params.routing) {
        query_params.push(("routing", routing));
    }

    super::connecting(host, client);
    let response = client
        .rest_call(Method::Post, &path, &query_params, Some(&query))
        .await?;
    Ok(response.unwrap_or_else(|| json!({})))
}

pub async fn run_query<H: Host>(
    host: &mut H,
    client: &Client,
    params: &QueryParams,
    result: &mut ActionResult,
) -> Result<(), ConnectorError> {
    let response = execute_query(host, client, params).await?;
    result.update_summary(SUMMARY_TOTAL_HITS, elastic::total_hits(&response));
    result.update_summary(SUMMARY_TIMED_OUT, elastic::timed_out(&response));
    result.add_data(response);
    result.set_success("");
    Ok(())
}
