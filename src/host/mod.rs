// SPDX-License-Identifier: MIT

//! The interface to the platform that drives the connector.

use crate::actions::ActionResult;
use crate::config::AssetConfig;
use crate::ingest::Container;
use crate::prelude::*;

pub mod standalone;
pub use standalone::StandaloneHost;

pub type ContainerId = u64;

/// What the connector needs from the platform hosting it. Everything the
/// connector does goes through this trait; it never talks to a concrete
/// platform.
pub trait Host {
    /// The asset configuration for the current invocation.
    fn config(&self) -> &AssetConfig;

    fn save_progress(&mut self, message: &str);

    /// Store a container along with its artifacts.
    fn save_container(&mut self, container: Container) -> Result<ContainerId, ConnectorError>;

    fn report_result(&mut self, result: ActionResult);

    /// True for a manually triggered poll.
    fn is_poll_now(&self) -> bool {
        false
    }
}
