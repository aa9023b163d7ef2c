// SPDX-License-Identifier: MIT

use super::{Container, IngestParserRegistry};
use crate::actions::run_query::{self, QueryParams};
use crate::actions::{ActionResult, SUMMARY_TOTAL_HITS};
use crate::elastic::{self, Client};
use crate::error::strip_braces;
use crate::host::Host;
use crate::prelude::*;

pub const ERR_INGEST_CONFIG: &str = "Ingestion requires a configured index and query.";

pub const SUMMARY_CONTAINERS_SAVED: &str = "containers_saved";
pub const SUMMARY_CONTAINERS_FAILED: &str = "containers_failed";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PollParams {
    /// Maximum number of hits to ingest on a manual poll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_count: Option<usize>,
}

/// Apply the per-cycle cap. Only manual polls are capped; scheduled polls
/// ingest every hit.
pub fn apply_container_cap<T>(items: &mut Vec<T>, cap: Option<usize>, poll_now: bool) {
    if let Some(cap) = cap.filter(|cap| *cap > 0) {
        if poll_now && items.len() > cap {
            debug!("Limiting poll to {} of {} hits", cap, items.len());
            items.truncate(cap);
        }
    }
}

/// One poll cycle: run the configured query, convert each hit with the
/// configured parser and hand the containers to the host. Nothing is
/// carried over between cycles.
pub async fn on_poll<H: Host>(
    host: &mut H,
    client: &Client,
    parsers: &IngestParserRegistry,
    params: &PollParams,
    result: &mut ActionResult,
) -> Result<(), ConnectorError> {
    let config = host.config().clone();
    let (index, query) = match (
        config.ingest_index.as_deref().filter(|s| !s.trim().is_empty()),
        config.ingest_query.as_deref().filter(|s| !s.trim().is_empty()),
    ) {
        (Some(index), Some(query)) => (index.to_string(), query.to_string()),
        _ => return Err(ConnectorError::Validation(ERR_INGEST_CONFIG.to_string())),
    };

    let parser = parsers.get(config.ingest_parser.as_deref())?;
    if config
        .ingest_parser
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty())
    {
        host.save_progress(&format!("Using specified parser: {}", parser.name()));
    }

    let query_params = QueryParams {
        index,
        query,
        doc_type: config.ingest_type.clone(),
        routing: config.ingest_routing.clone(),
    };
    let response = run_query::execute_query(host, client, &query_params).await?;
    result.update_summary(SUMMARY_TOTAL_HITS, elastic::total_hits(&response));

    let mut hits = elastic::hits(&response);
    apply_container_cap(&mut hits, params.container_count, host.is_poll_now());

    // Every hit is converted before anything is saved, so a failing parser
    // leaves nothing half ingested.
    let label = config.ingest.container_label.as_deref();
    let mut containers: Vec<Container> = Vec::new();
    for hit in &hits {
        let bundles = parser.parse(hit).map_err(|err| {
            let detail = match err {
                ConnectorError::Transform(detail) => detail,
                other => other.to_string(),
            };
            ConnectorError::Transform(strip_braces(&detail))
        })?;
        match bundles {
            Some(bundles) => {
                containers.extend(bundles.into_iter().map(|b| b.into_container(label)));
            }
            None => debug!("Parser {} skipped hit {}", parser.name(), hit.id),
        }
    }

    let mut saved = 0;
    let mut failed = 0;
    for container in containers {
        let name = container.name.clone();
        match host.save_container(container) {
            Ok(id) => {
                debug!("Saved container {}: {}", id, name);
                saved += 1;
            }
            Err(err) => {
                warn!("Failed to save container {}: {}", name, err);
                failed += 1;
            }
        }
    }

    info!(
        hits = hits.len(),
        saved, failed, "Poll complete for index {}", query_params.index
    );
    result.update_summary(SUMMARY_CONTAINERS_SAVED, saved);
    result.update_summary(SUMMARY_CONTAINERS_FAILED, failed);
    if failed > 0 {
        result.set_success(format!(
            "Saved {saved} containers, {failed} failed to save"
        ));
    } else {
        result.set_success(format!("Saved {saved} containers"));
    }
    Ok(())
}
