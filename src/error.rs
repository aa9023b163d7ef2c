// SPDX-License-Identifier: MIT

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Upper bound on any message surfaced to the host.
pub const MAX_MESSAGE_LEN: usize = 1024;

#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Bad action parameters or missing configuration. Raised before
    /// any request is made.
    #[error("{0}")]
    Validation(String),

    /// Timeouts, refused connections, TLS failures.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A response from the server that does not indicate success. The
    /// parsed body, if any, is kept so it can be attached to the
    /// action result.
    #[error("API failed, Status code: {status}, Detail: {detail}")]
    Server {
        status: u16,
        detail: String,
        body: Option<JsonValue>,
    },

    #[error("{0}")]
    Parse(String),

    /// A failure inside an ingest parser.
    #[error("Unable to execute ingest parser: {0}")]
    Transform(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// The host refused an operation, such as saving a container.
    #[error("host error: {0}")]
    Host(String),
}

impl ConnectorError {
    /// The message to surface to the host, bounded in length.
    pub fn message(&self) -> String {
        truncate(&self.to_string(), MAX_MESSAGE_LEN)
    }

    /// Server provided body attached to this error, if any.
    pub fn body(&self) -> Option<&JsonValue> {
        match self {
            ConnectorError::Server { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ConnectorError::Config(err.to_string())
        } else {
            ConnectorError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Parse(err.to_string())
    }
}

/// Truncate a string to at most `max` characters, appending "..." when
/// something was cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Remove curly braces from text that originates on the server so it can
/// be placed inside a message without being mistaken for a format
/// placeholder further down the line.
pub fn strip_braces(s: &str) -> String {
    s.replace(['{', '}'], "")
}
