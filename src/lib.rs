// SPDX-License-Identifier: MIT

//! An Elasticsearch connector for security orchestration platforms.
//!
//! The connector runs a small set of actions against a cluster (test
//! connectivity, run a query, list indices) and polls a configured query
//! to turn search hits into containers and artifacts. The platform is
//! reached only through the [`host::Host`] trait.

// Clippy suppressions. These are the global ones I don't care about.
#![allow(clippy::needless_return)]
#![allow(clippy::redundant_field_names)]

pub mod logger;

pub mod actions;
pub mod cli;
pub mod config;
pub mod elastic;
pub mod error;
pub mod host;
pub mod ingest;
pub(crate) mod prelude;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{Action, ActionResult, Connector, Status};
pub use error::ConnectorError;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_json;
