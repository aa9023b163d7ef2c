// SPDX-License-Identifier: MIT

//! Actions the connector performs on behalf of the host, and the result
//! record reported back for each.

use indexmap::IndexMap;

use crate::elastic::Client;
use crate::host::Host;
use crate::ingest::{self, IngestParserRegistry, PollParams};
use crate::prelude::*;

pub mod get_config;
pub mod run_query;
pub mod test_connectivity;

pub use run_query::QueryParams;

pub const ACTION_ID_TEST_CONNECTIVITY: &str = "test_asset_connectivity";
pub const ACTION_ID_RUN_QUERY: &str = "run_query";
pub const ACTION_ID_GET_CONFIG: &str = "get_config";
pub const ACTION_ID_ON_POLL: &str = "on_poll";

pub const SUMMARY_TOTAL_HITS: &str = "total_hits";
pub const SUMMARY_TIMED_OUT: &str = "timed_out";
pub const SUMMARY_TOTAL_INDICES: &str = "total_indices";

#[derive(Debug, Clone)]
pub enum Action {
    TestConnectivity,
    RunQuery(QueryParams),
    GetConfig,
    OnPoll(PollParams),
}

impl Action {
    /// Parse an action from its identifier and the parameter record
    /// supplied by the host.
    pub fn from_identifier(identifier: &str, params: &JsonValue) -> Result<Self, ConnectorError> {
        let params = if params.is_null() {
            JsonValue::Object(Default::default())
        } else {
            params.clone()
        };
        let invalid = |err: serde_json::Error| {
            ConnectorError::Validation(format!("invalid parameters for {identifier}: {err}"))
        };
        match identifier {
            ACTION_ID_TEST_CONNECTIVITY => Ok(Action::TestConnectivity),
            ACTION_ID_RUN_QUERY => Ok(Action::RunQuery(
                serde_json::from_value(params).map_err(invalid)?,
            )),
            ACTION_ID_GET_CONFIG => Ok(Action::GetConfig),
            ACTION_ID_ON_POLL => Ok(Action::OnPoll(
                serde_json::from_value(params).map_err(invalid)?,
            )),
            _ => Err(ConnectorError::Validation(format!(
                "unsupported action: {identifier}"
            ))),
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Action::TestConnectivity => ACTION_ID_TEST_CONNECTIVITY,
            Action::RunQuery(_) => ACTION_ID_RUN_QUERY,
            Action::GetConfig => ACTION_ID_GET_CONFIG,
            Action::OnPoll(_) => ACTION_ID_ON_POLL,
        }
    }

    fn parameters(&self) -> JsonValue {
        let params = match self {
            Action::RunQuery(params) => serde_json::to_value(params),
            Action::OnPoll(params) => serde_json::to_value(params),
            _ => return json!({}),
        };
        params.unwrap_or_else(|_| json!({}))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// The structured outcome of one action invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub action: String,
    pub status: Status,
    pub message: String,
    pub parameters: JsonValue,
    pub summary: IndexMap<String, JsonValue>,
    pub data: Vec<JsonValue>,
}

impl ActionResult {
    pub fn new(action: &str, parameters: JsonValue) -> Self {
        Self {
            action: action.to_string(),
            status: Status::Success,
            message: String::new(),
            parameters,
            summary: IndexMap::new(),
            data: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.status = Status::Success;
        self.message = message.into();
    }

    /// Mark as failed. A response body carried by the error is attached
    /// to the result data.
    pub fn set_error(&mut self, err: &ConnectorError) {
        self.status = Status::Failed;
        self.message = err.message();
        if let Some(body) = err.body() {
            self.data.push(body.clone());
        }
    }

    pub fn update_summary(&mut self, key: &str, value: impl Into<JsonValue>) {
        self.summary.insert(key.to_string(), value.into());
    }

    pub fn add_data(&mut self, data: JsonValue) {
        self.data.push(data);
    }
}

/// Dispatches actions to their handlers.
pub struct Connector {
    parsers: IngestParserRegistry,
}

impl Default for Connector {
    fn default() -> Self {
        Self::new(IngestParserRegistry::default())
    }
}

impl Connector {
    pub fn new(parsers: IngestParserRegistry) -> Self {
        Self { parsers }
    }

    pub fn parsers(&self) -> &IngestParserRegistry {
        &self.parsers
    }

    /// Run an action to completion and report its result to the host.
    /// Errors never escape; they are folded into the reported result.
    #[instrument(skip_all, fields(action = action.identifier()))]
    pub async fn handle_action<H: Host>(&self, host: &mut H, action: Action) -> Status {
        let mut result = ActionResult::new(action.identifier(), action.parameters());

        // The configuration is read fresh for every invocation.
        let client = match host.config().client() {
            Ok(client) => client,
            Err(err) => {
                error!("Failed to initialize client: {}", err);
                result.set_error(&err);
                let status = result.status;
                host.report_result(result);
                return status;
            }
        };

        let outcome = match &action {
            Action::TestConnectivity => {
                test_connectivity::test_connectivity(host, &client, &mut result).await
            }
            Action::RunQuery(params) => {
                run_query::run_query(host, &client, params, &mut result).await
            }
            Action::GetConfig => get_config::get_config(host, &client, &mut result).await,
            Action::OnPoll(params) => {
                ingest::poll::on_poll(host, &client, &self.parsers, params, &mut result).await
            }
        };

        if let Err(err) = outcome {
            debug!("{} failed: {}", action.identifier(), err);
            result.set_error(&err);
        }
        let status = result.status;
        host.report_result(result);
        status
    }
}

/// Progress messages common to every call to the server.
pub(crate) fn connecting<H: Host>(host: &mut H, client: &Client) {
    host.save_progress(&format!("Connecting to {}...", client.host()));
    if client.has_auth() {
        host.save_progress("Using authentication");
    } else {
        host.save_progress(
            "Not using any authentication, since either the password or username not specified",
        );
    }
}
