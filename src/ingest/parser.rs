// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Artifact, Container, ContainerBundle, CONTAINER_NAME_SOURCE};
use crate::elastic::Hit;
use crate::prelude::*;

pub const DEFAULT_PARSER: &str = "elasticsearch";

/// Turns a search hit into zero or more containers.
///
/// Parsers are compiled in and registered by name with an
/// [`IngestParserRegistry`]; the asset configuration selects one with
/// `ingest_parser`.
pub trait IngestParser: Send + Sync {
    fn name(&self) -> &str;

    /// Returning `Ok(None)` skips the hit. An error aborts the poll.
    fn parse(&self, hit: &Hit) -> Result<Option<Vec<ContainerBundle>>, ConnectorError>;
}

/// The built-in mapping: one container with one artifact per hit, the
/// artifact carrying the document source unchanged.
#[derive(Debug, Default)]
pub struct ElasticsearchParser;

impl IngestParser for ElasticsearchParser {
    fn name(&self) -> &str {
        DEFAULT_PARSER
    }

    fn parse(&self, hit: &Hit) -> Result<Option<Vec<ContainerBundle>>, ConnectorError> {
        Ok(Some(vec![bundle(hit, hit.source.clone())]))
    }
}

/// Like [`ElasticsearchParser`] but flattens nested source fields into
/// dotted keys, giving a flat key-value artifact.
#[derive(Debug, Default)]
pub struct FlattenParser;

impl IngestParser for FlattenParser {
    fn name(&self) -> &str {
        "elasticsearch_flat"
    }

    fn parse(&self, hit: &Hit) -> Result<Option<Vec<ContainerBundle>>, ConnectorError> {
        if !hit.source.is_object() {
            debug!("Hit {} has no object source, skipping", hit.id);
            return Ok(None);
        }
        let mut flat = BTreeMap::new();
        flatten("", &hit.source, &mut flat);
        let cef = serde_json::to_value(flat)?;
        Ok(Some(vec![bundle(hit, cef)]))
    }
}

fn bundle(hit: &Hit, cef: JsonValue) -> ContainerBundle {
    debug!("Found hit {}. Building container", hit.id);
    let container = Container {
        name: format!(
            "{}: {} {} {}",
            CONTAINER_NAME_SOURCE, hit.index, hit.doc_type, hit.id
        ),
        source_data_identifier: hit.id.clone(),
        run_automation: false,
        label: None,
        artifacts: Vec::new(),
    };
    // There is only ever one artifact, so it may trigger automation.
    let artifact = Artifact {
        label: "event".to_string(),
        name: "elasticsearch event".to_string(),
        cef,
        source_data_identifier: hit.id.clone(),
        run_automation: true,
    };
    ContainerBundle {
        container,
        artifacts: vec![artifact],
    }
}

fn flatten(prefix: &str, value: &JsonValue, out: &mut BTreeMap<String, JsonValue>) {
    match value {
        JsonValue::Object(map) => {
            for (key, value) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, value, out);
            }
        }
        _ => {
            out.insert(prefix.to_string(), value.clone());
        }
    }
}

/// The set of parsers available for ingestion.
#[derive(Clone)]
pub struct IngestParserRegistry {
    parsers: BTreeMap<String, Arc<dyn IngestParser>>,
}

impl Default for IngestParserRegistry {
    /// A registry with the built-in parsers.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(ElasticsearchParser));
        registry.register(Arc::new(FlattenParser));
        registry
    }
}

impl IngestParserRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: BTreeMap::new(),
        }
    }

    /// Register a parser, replacing any existing parser of the same name.
    pub fn register(&mut self, parser: Arc<dyn IngestParser>) {
        let name = parser.name().to_string();
        if self.parsers.insert(name.clone(), parser).is_some() {
            warn!("Replaced ingest parser {}", name);
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.parsers.keys().map(String::as_str).collect()
    }

    /// Look up a parser by name, `None` selecting the default.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn IngestParser>, ConnectorError> {
        let name = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PARSER);
        self.parsers.get(name).cloned().ok_or_else(|| {
            ConnectorError::Validation(format!(
                "Unknown ingest parser: {name}. Available parsers: {}",
                self.names().join(", ")
            ))
        })
    }
}
