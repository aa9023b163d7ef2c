// SPDX-License-Identifier: MIT

use std::io::Write;
use std::path::PathBuf;

use super::{ContainerId, Host};
use crate::actions::{Action, ActionResult};
use crate::config::AssetConfig;
use crate::ingest::Container;
use crate::prelude::*;

/// A host for running the connector outside of a platform. Progress goes
/// to the log, results and containers are written as JSON.
pub struct StandaloneHost {
    config: AssetConfig,
    poll_now: bool,
    output: Option<PathBuf>,
    next_id: ContainerId,
    results: Vec<ActionResult>,
}

impl StandaloneHost {
    pub fn new(config: AssetConfig) -> Self {
        Self {
            config,
            poll_now: false,
            output: None,
            next_id: 1,
            results: Vec::new(),
        }
    }

    pub fn with_poll_now(mut self, poll_now: bool) -> Self {
        self.poll_now = poll_now;
        self
    }

    /// Write containers as files into `dir` rather than to stdout.
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output = Some(dir);
        self
    }

    pub fn results(&self) -> &[ActionResult] {
        &self.results
    }

    fn write_stdout(value: &impl Serialize) -> Result<(), ConnectorError> {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, value)?;
        writeln!(stdout).map_err(|err| ConnectorError::Host(err.to_string()))
    }
}

impl Host for StandaloneHost {
    fn config(&self) -> &AssetConfig {
        &self.config
    }

    fn save_progress(&mut self, message: &str) {
        info!("{}", message);
    }

    fn save_container(&mut self, container: Container) -> Result<ContainerId, ConnectorError> {
        let id = self.next_id;
        match &self.output {
            Some(dir) => {
                let filename = dir.join(format!("container-{id}.json"));
                let file = std::fs::File::create(&filename).map_err(|err| {
                    ConnectorError::Host(format!("{}: {}", filename.display(), err))
                })?;
                serde_json::to_writer_pretty(file, &container)?;
                debug!("Wrote container {} to {}", id, filename.display());
            }
            None => Self::write_stdout(&container)?,
        }
        self.next_id += 1;
        Ok(id)
    }

    fn report_result(&mut self, result: ActionResult) {
        if result.is_success() {
            info!("{}: success {}", result.action, result.message);
        } else {
            error!("{}: failed: {}", result.action, result.message);
        }
        if let Err(err) = Self::write_stdout(&result) {
            error!("Failed to write result: {}", err);
        }
        self.results.push(result);
    }

    fn is_poll_now(&self) -> bool {
        self.poll_now
    }
}

/// An action file for standalone debugging, in the shape a platform hands
/// to its connectors: one identifier, the asset configuration, and one
/// parameter record per invocation.
#[derive(Debug, Deserialize)]
pub struct ActionFile {
    pub identifier: String,
    pub config: JsonValue,
    #[serde(default)]
    pub parameters: Vec<JsonValue>,
    #[serde(default)]
    pub poll_now: bool,
}

impl ActionFile {
    pub fn load(filename: &str) -> Result<Self, ConnectorError> {
        let file = std::fs::File::open(filename)
            .map_err(|err| ConnectorError::Config(format!("{filename}: {err}")))?;
        serde_json::from_reader(file)
            .map_err(|err| ConnectorError::Config(format!("{filename}: {err}")))
    }

    pub fn asset_config(&self) -> Result<AssetConfig, ConnectorError> {
        AssetConfig::from_json(self.config.clone())
    }

    /// One action per parameter record. No parameters means a single
    /// invocation with an empty record.
    pub fn actions(&self) -> Result<Vec<Action>, ConnectorError> {
        if self.parameters.is_empty() {
            return Ok(vec![Action::from_identifier(
                &self.identifier,
                &JsonValue::Null,
            )?]);
        }
        self.parameters
            .iter()
            .map(|params| Action::from_identifier(&self.identifier, params))
            .collect()
    }
}
