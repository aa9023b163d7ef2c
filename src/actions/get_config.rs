// SPDX-License-Identifier: MIT

use super::{ActionResult, SUMMARY_TOTAL_INDICES};
use crate::elastic::{Client, IndexInfo, Method};
use crate::error::{strip_braces, truncate};
use crate::host::Host;
use crate::prelude::*;

pub const INDEX_LIST_PATH: &str = "/_cat/indices";

/// List the indices of the cluster with their health, status, document
/// count and store size.
pub async fn list_indices<H: Host>(
    host: &mut H,
    client: &Client,
) -> Result<Vec<IndexInfo>, ConnectorError> {
    super::connecting(host, client);
    let response = client
        .rest_call(
            Method::Get,
            INDEX_LIST_PATH,
            &[("format", "json"), ("bytes", "b")],
            None,
        )
        .await?;
    let entries = match response {
        Some(JsonValue::Array(entries)) => entries,
        None => Vec::new(),
        Some(other) => {
            return Err(ConnectorError::Parse(format!(
                "Unexpected index listing response: {}",
                truncate(&strip_braces(&other.to_string()), 200)
            )))
        }
    };
    let mut indices = Vec::with_capacity(entries.len());
    for entry in &entries {
        match IndexInfo::from_cat_entry(entry) {
            Some(info) => indices.push(info),
            None => warn!("Skipping index entry without a name: {}", entry),
        }
    }
    Ok(indices)
}

pub async fn get_config<H: Host>(
    host: &mut H,
    client: &Client,
    result: &mut ActionResult,
) -> Result<(), ConnectorError> {
    let indices = list_indices(host, client).await?;
    result.update_summary(SUMMARY_TOTAL_INDICES, indices.len());
    for index in indices {
        result.add_data(serde_json::to_value(index)?);
    }
    result.set_success("");
    Ok(())
}
