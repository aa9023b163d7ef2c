// SPDX-License-Identifier: MIT

//! Test helpers: an in-process HTTP server standing in for Elasticsearch.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;

use crate::actions::ActionResult;
use crate::config::AssetConfig;
use crate::error::ConnectorError;
use crate::host::{ContainerId, Host};
use crate::ingest::Container;

pub(crate) struct MockServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl MockServer {
    pub(crate) async fn start(router: axum::Router) -> Self {
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();
        let router = router.layer(middleware::from_fn(move |req: Request, next: Next| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let response: Response = next.run(req).await;
                response
            }
        }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { addr, requests }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests the server has seen.
    pub(crate) fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// A canned search response with one hit per id.
pub(crate) fn search_response(ids: &[&str]) -> serde_json::Value {
    let hits: Vec<serde_json::Value> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            serde_json::json!({
                "_index": "idx",
                "_type": "_doc",
                "_id": id,
                "_score": 1.0,
                "_source": {"n": i, "message": format!("event {id}")},
            })
        })
        .collect();
    serde_json::json!({
        "took": 3,
        "timed_out": false,
        "_shards": {"total": 1, "successful": 1, "skipped": 0, "failed": 0},
        "hits": {
            "total": {"value": ids.len(), "relation": "eq"},
            "max_score": 1.0,
            "hits": hits,
        }
    })
}

/// A host that records everything the connector hands it.
pub(crate) struct RecordingHost {
    pub(crate) config: AssetConfig,
    pub(crate) poll_now: bool,
    pub(crate) progress: Vec<String>,
    pub(crate) containers: Vec<Container>,
    pub(crate) results: Vec<ActionResult>,
    /// Source identifiers of containers to refuse.
    pub(crate) reject: Vec<String>,
}

impl RecordingHost {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            config: AssetConfig {
                url: url.to_string(),
                verify_server_cert: true,
                ..Default::default()
            },
            poll_now: false,
            progress: Vec::new(),
            containers: Vec::new(),
            results: Vec::new(),
            reject: Vec::new(),
        }
    }
}

impl Host for RecordingHost {
    fn config(&self) -> &AssetConfig {
        &self.config
    }

    fn save_progress(&mut self, message: &str) {
        self.progress.push(message.to_string());
    }

    fn save_container(&mut self, container: Container) -> Result<ContainerId, ConnectorError> {
        if self.reject.contains(&container.source_data_identifier) {
            return Err(ConnectorError::Host("duplicate container".to_string()));
        }
        self.containers.push(container);
        Ok(self.containers.len() as ContainerId)
    }

    fn report_result(&mut self, result: ActionResult) {
        self.results.push(result);
    }

    fn is_poll_now(&self) -> bool {
        self.poll_now
    }
}
