// SPDX-License-Identifier: MIT

//! Conversion of search hits into containers and artifacts, and the poll
//! routine that feeds them to the host.

use crate::prelude::*;

pub mod parser;
pub mod poll;

pub use parser::{ElasticsearchParser, FlattenParser, IngestParser, IngestParserRegistry};
pub use poll::PollParams;

/// Prefix of every container name produced by the built-in parsers.
pub const CONTAINER_NAME_SOURCE: &str = "Elasticsearch";

/// An ingested event as the host stores it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub name: String,
    pub source_data_identifier: String,
    pub run_automation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
}

/// Evidence attached to a container. `cef` holds the event fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Artifact {
    pub label: String,
    pub name: String,
    pub cef: JsonValue,
    pub source_data_identifier: String,
    pub run_automation: bool,
}

/// What a parser produces for a hit: a container and the artifacts that
/// belong to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContainerBundle {
    pub container: Container,
    pub artifacts: Vec<Artifact>,
}

impl ContainerBundle {
    /// The container as handed to the host: labelled, with its artifacts
    /// attached.
    pub fn into_container(self, label: Option<&str>) -> Container {
        let mut container = self.container;
        container.label = label.map(String::from);
        container.artifacts = self.artifacts;
        container
    }
}
